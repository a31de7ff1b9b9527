//! # Grid Module
//!
//! The addressable 3D grid the editor mutates. Anything that can read and
//! write blocks by world and position can host the editor by implementing
//! [`BlockGrid`]; the crate ships a chunked in-memory [`World`](super::world::World).

use std::fmt;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use super::block::BlockState;

/// A block position in world coordinates.
pub type Position = Point3<i32>;

/// Identifies one world (dimension) inside a grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub u32);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

/// Read/write access to blocks.
///
/// Implementations are only ever written to from the tick thread. Reads may
/// additionally come from region scan workers, so grids shared with a
/// scanning editor must be `Send + Sync`.
pub trait BlockGrid {
    /// Returns the block at `pos`, or `None` if the grid cannot provide one
    /// there (unloaded, out of bounds).
    fn block_at(&self, world: WorldId, pos: Position) -> Option<BlockState>;

    /// Writes `state` at `pos`.
    ///
    /// # Returns
    /// `false` if the grid was unable to apply the write.
    fn set_block(&mut self, world: WorldId, pos: Position, state: BlockState) -> bool;
}
