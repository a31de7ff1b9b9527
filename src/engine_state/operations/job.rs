//! # Edit Jobs
//!
//! An [`EditJob`] is a resumable edit over a pre-scanned list of positions.
//! The direct executor runs a job in one call with an unbounded budget; the
//! incremental executor runs the same job a batch at a time from the tick
//! loop. Both paths go through [`EditJob::run_batch`], so they write the same
//! blocks, capture the same undo state and account for materials the same
//! way.
//!
//! For each position a batch:
//! 1. reads the current state, skipping the position if the world cannot
//!    provide it
//! 2. re-checks the blacklist (and for replace, that the block still matches)
//! 3. picks the material to place, drawing from the pattern if there is one
//! 4. writes the block and, only if the write succeeded, records the prior
//!    state in the undo capture and tallies the material as used

use std::collections::BTreeMap;
use std::fmt;

use fastrand::Rng;
use log::{debug, warn};

use super::blacklist::Blacklist;
use super::events::{ExecutionMode, OperationId};
use super::pattern::BlockPattern;
use super::undo::UndoRecord;
use crate::engine_state::voxels::block::{BlockState, Material};
use crate::engine_state::voxels::grid::{BlockGrid, Position, WorldId};
use crate::engine_state::ActorId;

/// The mutation an edit applies to each position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditKind {
    /// Fill with one material.
    Set(Material),
    /// Swap every `from` block for `to`.
    Replace { from: Material, to: Material },
    /// Fill with materials drawn from a weighted pattern.
    Pattern(BlockPattern),
}

impl EditKind {
    /// Which positions of the region the edit applies to.
    pub fn scan_filter(&self) -> ScanFilter {
        match self {
            EditKind::Replace { from, .. } => ScanFilter::Matching(*from),
            EditKind::Set(_) | EditKind::Pattern(_) => ScanFilter::Applicable,
        }
    }

    /// Every material the edit may place.
    pub fn targets(&self) -> Vec<Material> {
        match self {
            EditKind::Set(material) => vec![*material],
            EditKind::Replace { to, .. } => vec![*to],
            EditKind::Pattern(pattern) => pattern.materials().collect(),
        }
    }

    /// Materials to reserve for `count` positions. Air is free.
    pub fn requirements(&self, count: u64) -> BTreeMap<Material, u64> {
        let mut requirements = match self {
            EditKind::Set(material) | EditKind::Replace { to: material, .. } => {
                BTreeMap::from([(*material, count)])
            }
            EditKind::Pattern(pattern) => pattern.estimate_requirements(count),
        };
        requirements.retain(|material, amount| !material.is_empty() && *amount > 0);
        requirements
    }
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditKind::Set(material) => write!(f, "set {material}"),
            EditKind::Replace { from, to } => write!(f, "replace {from} with {to}"),
            EditKind::Pattern(pattern) => {
                f.write_str("pattern ")?;
                for (i, entry) in pattern.entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", entry.material.name(), entry.weight)?;
                }
                Ok(())
            }
        }
    }
}

/// Decides whether a scanned position belongs to an edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScanFilter {
    /// Any block that is not blacklisted.
    Applicable,
    /// Blocks of one material, unless that material is blacklisted.
    Matching(Material),
}

impl ScanFilter {
    pub fn accepts(&self, state: &BlockState, blacklist: &Blacklist) -> bool {
        if blacklist.protects(state) {
            return false;
        }
        match self {
            ScanFilter::Applicable => true,
            ScanFilter::Matching(material) => state.material == *material,
        }
    }
}

/// Materials debited up front and how many of them were actually placed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reservation {
    reserved: BTreeMap<Material, u64>,
    used: BTreeMap<Material, u64>,
}

impl Reservation {
    pub fn new(reserved: BTreeMap<Material, u64>) -> Self {
        Reservation {
            reserved,
            used: BTreeMap::new(),
        }
    }

    pub fn reserved(&self) -> &BTreeMap<Material, u64> {
        &self.reserved
    }

    pub fn used(&self) -> &BTreeMap<Material, u64> {
        &self.used
    }

    fn amount(map: &BTreeMap<Material, u64>, material: Material) -> u64 {
        map.get(&material).copied().unwrap_or(0)
    }

    /// Reserved units of `material` not used yet.
    pub fn remaining(&self, material: Material) -> u64 {
        Self::amount(&self.reserved, material).saturating_sub(Self::amount(&self.used, material))
    }

    /// Whether one more block of `material` may be placed.
    pub fn allows(&self, material: Material) -> bool {
        material.is_empty() || self.remaining(material) > 0
    }

    fn consume(&mut self, material: Material) {
        if !material.is_empty() {
            *self.used.entry(material).or_default() += 1;
        }
    }

    /// Everything reserved but not used.
    pub fn unused(&self) -> BTreeMap<Material, u64> {
        self.reserved
            .keys()
            .map(|material| (*material, self.remaining(*material)))
            .filter(|(_, amount)| *amount > 0)
            .collect()
    }
}

/// Whether a job has more positions to process.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Done,
}

/// A resumable edit. See the module docs for what each position goes through.
pub struct EditJob {
    id: OperationId,
    actor: ActorId,
    world: WorldId,
    kind: EditKind,
    mode: ExecutionMode,
    positions: Vec<Position>,
    cursor: usize,
    undo: UndoRecord,
    reservation: Reservation,
    returned: BTreeMap<Material, u64>,
    affected: u64,
    skipped: u64,
    rng: Rng,
    cancelled: bool,
    last_reported_percent: u8,
    ticks_until_due: u32,
}

/// Everything left of a job once it stops running.
pub struct FinishedJob {
    pub id: OperationId,
    pub actor: ActorId,
    pub world: WorldId,
    pub kind: EditKind,
    pub mode: ExecutionMode,
    pub affected: u64,
    pub skipped: u64,
    pub consumed: BTreeMap<Material, u64>,
    pub unused: BTreeMap<Material, u64>,
    pub returned: BTreeMap<Material, u64>,
    pub undo: UndoRecord,
}

impl EditJob {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OperationId,
        actor: ActorId,
        world: WorldId,
        kind: EditKind,
        mode: ExecutionMode,
        positions: Vec<Position>,
        reservation: Reservation,
        rng: Rng,
    ) -> Self {
        EditJob {
            id,
            actor,
            world,
            kind,
            mode,
            positions,
            cursor: 0,
            undo: UndoRecord::new(actor, world),
            reservation,
            returned: BTreeMap::new(),
            affected: 0,
            skipped: 0,
            rng,
            cancelled: false,
            last_reported_percent: 0,
            ticks_until_due: 0,
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn kind(&self) -> &EditKind {
        &self.kind
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.positions.len()
    }

    pub fn affected(&self) -> u64 {
        self.affected
    }

    pub fn reservation(&self) -> &Reservation {
        &self.reservation
    }

    pub fn undo_capture(&self) -> &UndoRecord {
        &self.undo
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Flags the job for cancellation at its next turn.
    ///
    /// # Returns
    /// `false` if it was already flagged.
    pub fn request_cancel(&mut self) -> bool {
        !std::mem::replace(&mut self.cancelled, true)
    }

    /// Counts down the ticks between batches. Returns true when the job may
    /// run a batch on this tick.
    pub fn is_due(&mut self) -> bool {
        if self.ticks_until_due > 0 {
            self.ticks_until_due -= 1;
            false
        } else {
            true
        }
    }

    /// Schedules the next batch `interval` ticks from now.
    pub fn wait_ticks(&mut self, interval: u32) {
        self.ticks_until_due = interval.saturating_sub(1);
    }

    /// Processes up to `budget` positions starting at the cursor.
    pub fn run_batch<G: BlockGrid + ?Sized>(
        &mut self,
        grid: &mut G,
        blacklist: &Blacklist,
        budget: usize,
    ) -> JobStatus {
        let end = self.cursor.saturating_add(budget).min(self.positions.len());
        while self.cursor < end {
            let pos = self.positions[self.cursor];
            self.cursor += 1;
            self.apply(grid, blacklist, pos);
        }
        debug!(
            "{} processed {}/{} positions",
            self.id,
            self.cursor,
            self.positions.len()
        );
        if self.cursor >= self.positions.len() {
            JobStatus::Done
        } else {
            JobStatus::Running
        }
    }

    fn apply<G: BlockGrid + ?Sized>(&mut self, grid: &mut G, blacklist: &Blacklist, pos: Position) {
        let Some(prior) = grid.block_at(self.world, pos) else {
            warn!("{}: skipping {pos:?}, block unavailable", self.id);
            self.skipped += 1;
            return;
        };
        if blacklist.protects(&prior) {
            debug!("{}: skipping {pos:?}, {} is blacklisted", self.id, prior.material);
            self.skipped += 1;
            return;
        }
        if let EditKind::Replace { from, .. } = self.kind {
            if prior.material != from {
                self.skipped += 1;
                return;
            }
        }

        let Some(target) = self.next_material() else {
            warn!("{}: skipping {pos:?}, reservation exhausted", self.id);
            self.skipped += 1;
            return;
        };

        if !grid.set_block(self.world, pos, BlockState::new(target)) {
            warn!("{}: write at {pos:?} failed", self.id);
            self.skipped += 1;
            return;
        }

        self.undo.capture(pos, prior);
        self.reservation.consume(target);
        self.affected += 1;
        if let EditKind::Replace { from, .. } = self.kind {
            if !from.is_empty() {
                *self.returned.entry(from).or_default() += 1;
            }
        }
    }

    fn next_material(&mut self) -> Option<Material> {
        let reservation = &self.reservation;
        let material = match &self.kind {
            EditKind::Set(material) | EditKind::Replace { to: material, .. } => Some(*material),
            EditKind::Pattern(pattern) => pattern
                .sample(&mut self.rng)
                .filter(|material| reservation.allows(*material))
                .or_else(|| {
                    pattern.sample_within(&mut self.rng, |material| reservation.allows(material))
                }),
        };
        material.filter(|material| reservation.allows(*material))
    }

    /// Reports progress when completion crosses a multiple of `interval`
    /// percent since the last report. Completion itself is not reported here.
    pub fn take_progress(&mut self, interval: u8) -> Option<u8> {
        let total = self.positions.len();
        if total == 0 || interval == 0 || self.cursor >= total {
            return None;
        }
        let percent = (self.cursor as u128 * 100 / total as u128) as u8;
        let step = percent / interval * interval;
        if step > self.last_reported_percent {
            self.last_reported_percent = step;
            Some(percent)
        } else {
            None
        }
    }

    pub fn finish(self) -> FinishedJob {
        FinishedJob {
            id: self.id,
            actor: self.actor,
            world: self.world,
            kind: self.kind,
            mode: self.mode,
            affected: self.affected,
            skipped: self.skipped,
            consumed: self.reservation.used().clone(),
            unused: self.reservation.unused(),
            returned: self.returned,
            undo: self.undo,
        }
    }
}
