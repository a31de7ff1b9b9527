//! # Region Operations
//!
//! Bulk edits over a selection and everything needed to account for and
//! reverse them.
//!
//! * `engine` - [`RegionEditor`], validation, routing, tick loop, undo and cancel
//! * `job` - The resumable per-position executor shared by both execution paths
//! * `registry` - At most one live operation per actor, plus the run queue
//! * `scan_task` - Finding the positions an edit applies to, inline or on a worker
//! * `pattern` - Weighted material patterns
//! * `undo` - Undo records and bounded histories
//! * `blacklist` - Materials edits never touch
//! * `events` - Reports, outcomes and the notification events

pub mod blacklist;
pub mod engine;
pub mod events;
pub mod job;
pub mod pattern;
pub mod registry;
pub mod scan_task;
pub mod undo;

pub use engine::RegionEditor;
