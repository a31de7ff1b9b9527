//! # Core Module
//!
//! Shared-ownership primitives used by the rest of the editor.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking.
//!   The world lives behind one so region scans can run on worker threads while
//!   every write stays on the tick thread.
//!
//! ## Usage
//! ```rust
//! use voxel_edit::core::MtResource;
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//! ```

pub mod mt_resource;

pub use mt_resource::MtResource;
