//! # Edit Events and Reports
//!
//! Results of finished edits and undos, and the notifications the editor
//! publishes to subscribers. Everything here implements `Display` with a
//! short human-readable line so presentation layers can forward it as is.

use std::collections::BTreeMap;
use std::fmt;

use super::job::EditKind;
use crate::engine_state::voxels::block::Material;
use crate::engine_state::voxels::grid::WorldId;
use crate::engine_state::ActorId;
use crate::error::EditError;

/// Identifies one edit request from acceptance to completion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Which executor ran an edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One synchronous pass.
    Direct,
    /// Bounded batches across ticks.
    Incremental,
}

/// Summary of a finished edit.
#[derive(Clone, Debug, PartialEq)]
pub struct EditReport {
    pub operation: OperationId,
    pub actor: ActorId,
    pub world: WorldId,
    pub kind: EditKind,
    pub mode: ExecutionMode,
    /// Blocks actually written.
    pub affected: u64,
    /// Positions skipped because the world could not provide or accept them.
    pub skipped: u64,
    /// Materials spent on written blocks.
    pub consumed: BTreeMap<Material, u64>,
    /// Reserved materials that were not needed and went back to the actor.
    pub refunded: BTreeMap<Material, u64>,
    /// Replaced-out materials credited to the actor.
    pub returned: BTreeMap<Material, u64>,
}

fn write_amounts(f: &mut fmt::Formatter<'_>, amounts: &BTreeMap<Material, u64>) -> fmt::Result {
    for (i, (material, amount)) in amounts.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{amount} {material}")?;
    }
    Ok(())
}

impl fmt::Display for EditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} block(s) affected", self.kind, self.affected)?;
        if !self.refunded.is_empty() {
            f.write_str(", refunded ")?;
            write_amounts(f, &self.refunded)?;
        }
        if !self.returned.is_empty() {
            f.write_str(", returned ")?;
            write_amounts(f, &self.returned)?;
        }
        Ok(())
    }
}

/// Summary of an undo.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UndoReport {
    pub restored: u64,
    pub skipped: u64,
    /// Materials removed by the undo and credited to the actor.
    pub credited: BTreeMap<Material, u64>,
}

impl fmt::Display for UndoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Undo restored {} block(s)", self.restored)?;
        if self.skipped > 0 {
            write!(f, " ({} skipped)", self.skipped)?;
        }
        Ok(())
    }
}

/// What an accepted edit request turned into.
#[derive(Clone, Debug, PartialEq)]
pub enum EditOutcome {
    /// Ran directly and is already finished.
    Completed(EditReport),
    /// Registered as an incremental job; progress follows on the event channel.
    Started { operation: OperationId, total: usize },
    /// Waiting for a background region scan; the edit is validated and
    /// started once the scan reports back.
    Scanning { operation: OperationId },
}

impl EditOutcome {
    pub fn operation(&self) -> OperationId {
        match self {
            EditOutcome::Completed(report) => report.operation,
            EditOutcome::Started { operation, .. }
            | EditOutcome::Scanning { operation } => *operation,
        }
    }

    /// The report, if the edit finished synchronously.
    pub fn report(&self) -> Option<&EditReport> {
        match self {
            EditOutcome::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// Notification published to every subscriber.
#[derive(Clone, Debug, PartialEq)]
pub enum EditEvent {
    Started {
        actor: ActorId,
        operation: OperationId,
        total: usize,
    },
    Progress {
        actor: ActorId,
        operation: OperationId,
        percent: u8,
        processed: usize,
        total: usize,
    },
    Completed {
        actor: ActorId,
        report: EditReport,
    },
    Cancelled {
        actor: ActorId,
        operation: OperationId,
        /// Blocks that stay written.
        written: u64,
        refunded: BTreeMap<Material, u64>,
    },
    Failed {
        actor: ActorId,
        operation: OperationId,
        error: EditError,
    },
}

impl EditEvent {
    pub fn actor(&self) -> ActorId {
        match self {
            EditEvent::Started { actor, .. }
            | EditEvent::Progress { actor, .. }
            | EditEvent::Completed { actor, .. }
            | EditEvent::Cancelled { actor, .. }
            | EditEvent::Failed { actor, .. } => *actor,
        }
    }

    pub fn operation(&self) -> OperationId {
        match self {
            EditEvent::Completed { report, .. } => report.operation,
            EditEvent::Started { operation, .. }
            | EditEvent::Progress { operation, .. }
            | EditEvent::Cancelled { operation, .. }
            | EditEvent::Failed { operation, .. } => *operation,
        }
    }
}

impl fmt::Display for EditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditEvent::Started { operation, total, .. } => {
                write!(f, "{operation} started: {total} block(s) queued")
            }
            EditEvent::Progress {
                operation,
                percent,
                processed,
                total,
                ..
            } => write!(f, "{operation}: {percent}% ({processed}/{total})"),
            EditEvent::Completed { report, .. } => {
                write!(f, "{} finished: {report}", report.operation)
            }
            EditEvent::Cancelled {
                operation, written, ..
            } => write!(f, "{operation} cancelled after {written} block(s)"),
            EditEvent::Failed { operation, error, .. } => write!(f, "{operation} failed: {error}"),
        }
    }
}
