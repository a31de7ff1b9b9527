//! # Voxel World
//!
//! The block storage the editor reads and writes.
//!
//! ## Architecture
//!
//! * **Block**: Materials and the block state value stored per position
//! * **Grid**: The [`BlockGrid`](grid::BlockGrid) trait the editor is written against
//! * **Chunk**: Fixed-size 16x16x16 block arrays with a solidity bit vector
//! * **World**: A sparse chunk map implementing `BlockGrid`, with vertical
//!   build limits and unloaded-chunk semantics
//!
//! ## Thread Safety
//!
//! The world is shared through `MtResource`: scans hold the read lock, the
//! tick thread takes the write lock for every block write.

pub mod block;
pub mod chunk;
pub mod grid;
pub mod world;
