//! # Engine State Module
//!
//! Everything the region editor keeps and mutates.
//!
//! ## Key Components
//!
//! * `voxels` - Blocks, chunks and the world grid the editor writes to
//! * `selection` - Per-actor two-corner selections
//! * `operations` - Patterns, edit jobs, undo history and the `RegionEditor` itself
//! * `inventory` - The material ledger edits are paid from
//! * `ranks` - Rank tiers and the quotas they grant
//! * `task_management` - Worker threads for background region scans
//!
//! ## Architecture
//!
//! Per-actor state (selections, undo histories, live operations) is kept in
//! explicit tables keyed by [`ActorId`] and owned by the editor. The world is
//! the only state shared with other threads.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod inventory;
pub mod operations;
pub mod ranks;
pub mod selection;
pub mod task_management;
pub mod voxels;

/// Identifies the user or session performing edits.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}
