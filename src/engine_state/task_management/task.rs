//! # Task System Core Trait
//!
//! This module defines the unit of work handed to the worker pool.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The returned output travels back over the worker's result channel
//! 4. The tick thread collects outputs with `TaskManager::drain_completed()`
//!    and acts on them; this is the only place results touch shared state
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `Task::Output` must be `Send` to be transferred back

/// A unit of work executed on a worker thread.
///
/// Tasks should own everything they need (or hold thread-safe handles such as
/// `MtResource`) and must not write to state owned by the tick thread.
pub trait Task: Send {
    /// The value produced by the task and handed back to the tick thread.
    type Output: Send + 'static;

    /// Performs the work. Runs on a worker thread.
    fn process(&self) -> Self::Output;

    /// Produces the output reported when `process` panicked, so whoever is
    /// waiting on this task still hears back.
    fn abandoned(&self) -> Self::Output;
}
