//! # Active Operation Registry
//!
//! Tracks the one live operation each actor may have. An operation is either
//! waiting for a background region scan or running as an incremental job.
//!
//! ```text
//! Idle -> (Scanning ->) Running -> Completed | Cancelled
//! ```
//!
//! Running jobs are also kept in a run queue in registration order; the tick
//! loop walks that queue so jobs of different actors interleave one batch at
//! a time.

use std::collections::{HashMap, VecDeque};

use super::events::OperationId;
use super::job::{EditJob, EditKind};
use crate::engine_state::selection::Bounds;
use crate::engine_state::voxels::grid::WorldId;
use crate::engine_state::ActorId;

/// An accepted edit whose region is still being scanned.
pub struct PendingEdit {
    pub id: OperationId,
    pub actor: ActorId,
    pub world: WorldId,
    pub bounds: Bounds,
    pub kind: EditKind,
    pub cancelled: bool,
}

/// The live operation of one actor.
pub enum ActiveOperation {
    Scanning(PendingEdit),
    Running(EditJob),
}

impl ActiveOperation {
    pub fn id(&self) -> OperationId {
        match self {
            ActiveOperation::Scanning(pending) => pending.id,
            ActiveOperation::Running(job) => job.id(),
        }
    }
}

#[derive(Default)]
pub struct ActiveOperationRegistry {
    operations: HashMap<ActorId, ActiveOperation>,
    run_queue: VecDeque<ActorId>,
}

impl ActiveOperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, actor: ActorId) -> bool {
        self.operations.contains_key(&actor)
    }

    pub fn get(&self, actor: ActorId) -> Option<&ActiveOperation> {
        self.operations.get(&actor)
    }

    /// Number of live operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Registers an edit waiting for its scan. The caller has checked the
    /// actor is idle.
    pub fn insert_scanning(&mut self, pending: PendingEdit) {
        self.operations
            .insert(pending.actor, ActiveOperation::Scanning(pending));
    }

    /// Registers a running job at the back of the run queue. The caller has
    /// checked the actor is idle.
    pub fn insert_running(&mut self, job: EditJob) {
        let actor = job.actor();
        self.operations.insert(actor, ActiveOperation::Running(job));
        self.run_queue.retain(|queued| *queued != actor);
        self.run_queue.push_back(actor);
    }

    /// Removes the actor's scanning entry if it belongs to `operation`.
    pub fn take_scanning(&mut self, actor: ActorId, operation: OperationId) -> Option<PendingEdit> {
        match self.operations.get(&actor) {
            Some(ActiveOperation::Scanning(pending)) if pending.id == operation => {}
            _ => return None,
        }
        match self.operations.remove(&actor) {
            Some(ActiveOperation::Scanning(pending)) => Some(pending),
            _ => None,
        }
    }

    pub fn running_mut(&mut self, actor: ActorId) -> Option<&mut EditJob> {
        match self.operations.get_mut(&actor) {
            Some(ActiveOperation::Running(job)) => Some(job),
            _ => None,
        }
    }

    /// Deregisters the actor's running job.
    pub fn remove_running(&mut self, actor: ActorId) -> Option<EditJob> {
        if !matches!(self.operations.get(&actor), Some(ActiveOperation::Running(_))) {
            return None;
        }
        self.run_queue.retain(|queued| *queued != actor);
        match self.operations.remove(&actor) {
            Some(ActiveOperation::Running(job)) => Some(job),
            _ => None,
        }
    }

    /// Flags the actor's live operation for cancellation.
    ///
    /// # Returns
    /// `false` if there is no live operation or it was already flagged.
    pub fn request_cancel(&mut self, actor: ActorId) -> bool {
        match self.operations.get_mut(&actor) {
            Some(ActiveOperation::Running(job)) => job.request_cancel(),
            Some(ActiveOperation::Scanning(pending)) => {
                !std::mem::replace(&mut pending.cancelled, true)
            }
            None => false,
        }
    }

    /// `(cursor, total)` of the actor's operation. A scanning operation
    /// reports a cursor of 0 over the selection volume.
    pub fn progress(&self, actor: ActorId) -> Option<(u64, u64)> {
        match self.operations.get(&actor)? {
            ActiveOperation::Scanning(pending) => Some((0, pending.bounds.volume())),
            ActiveOperation::Running(job) => Some((job.cursor() as u64, job.total() as u64)),
        }
    }

    /// Actors with running jobs, in registration order.
    pub fn run_queue(&self) -> Vec<ActorId> {
        self.run_queue.iter().copied().collect()
    }
}
