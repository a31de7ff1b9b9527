//! # Region Editor
//!
//! [`RegionEditor`] is the entry point for bulk edits. It validates requests,
//! reserves materials, routes each edit to the direct or incremental
//! executor, keeps per-actor undo histories, and publishes events.
//!
//! ## Request flow
//! 1. Refuse if the actor already has a live operation
//! 2. Check the selection, blacklisted targets, the pattern and (for set and
//!    pattern edits) the quota against the selection volume
//! 3. Scan the region for the positions the edit applies to, on a worker
//!    when the region is large and scan workers are configured
//! 4. For replace, check the quota against the number of matches; then check
//!    and debit the materials the applicable positions need
//! 5. Run the job directly, or register it to run a batch per tick
//! 6. On completion refund unused materials, credit replaced-out materials
//!    and push the undo record
//!
//! Every check happens before the first debit and the first write, so a
//! refused request leaves no trace.
//!
//! ## Threading
//! All block writes and ledger changes happen on the thread calling the
//! editor's methods, which the host drives from its tick loop. Scan workers
//! only take the world's read lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use fastrand::Rng;
use log::{debug, info, warn};

use super::blacklist::Blacklist;
use super::events::{EditEvent, EditOutcome, EditReport, ExecutionMode, OperationId, UndoReport};
use super::job::{EditJob, EditKind, FinishedJob, JobStatus, Reservation};
use super::pattern::BlockPattern;
use super::registry::{ActiveOperationRegistry, PendingEdit};
use super::scan_task::{scan_region, RegionScan, RegionScanTask};
use super::undo::UndoHistory;
use crate::config::EditConfig;
use crate::core::MtResource;
use crate::engine_state::inventory::MaterialLedger;
use crate::engine_state::ranks::QuotaResolver;
use crate::engine_state::selection::{Bounds, Selection, SelectionStore};
use crate::engine_state::task_management::TaskManager;
use crate::engine_state::voxels::block::Material;
use crate::engine_state::voxels::grid::{BlockGrid, Position, WorldId};
use crate::engine_state::ActorId;
use crate::error::{EditError, Result};

/// The region mutation engine.
///
/// Generic over the world grid `G`, the material ledger `L` and the quota
/// resolver `Q`.
pub struct RegionEditor<G, L, Q>
where
    G: BlockGrid + Send + Sync + 'static,
    L: MaterialLedger,
    Q: QuotaResolver,
{
    world: MtResource<G>,
    ledger: L,
    quota: Q,
    config: EditConfig,
    selections: SelectionStore,
    histories: HashMap<ActorId, UndoHistory>,
    registry: ActiveOperationRegistry,
    scanner: TaskManager<RegionScan>,
    rng: Rng,
    subscribers: Vec<Sender<EditEvent>>,
    next_operation: u64,
    ticks: u64,
}

impl<G, L, Q> RegionEditor<G, L, Q>
where
    G: BlockGrid + Send + Sync + 'static,
    L: MaterialLedger,
    Q: QuotaResolver,
{
    /// Creates an editor that owns `world`.
    pub fn new(world: G, ledger: L, quota: Q, config: EditConfig) -> Self {
        Self::with_shared_world(MtResource::new(world), ledger, quota, config)
    }

    /// Creates an editor over a world handle the host also holds.
    ///
    /// A config that fails validation is still accepted. A zero batch size
    /// then runs as a batch of one.
    pub fn with_shared_world(
        world: MtResource<G>,
        ledger: L,
        quota: Q,
        config: EditConfig,
    ) -> Self {
        if let Err(err) = config.validate() {
            warn!("editor created with an unvalidated config: {err}");
        }
        let scanner = TaskManager::new(config.execution.scan_workers);
        RegionEditor {
            world,
            ledger,
            quota,
            config,
            selections: SelectionStore::new(),
            histories: HashMap::new(),
            registry: ActiveOperationRegistry::new(),
            scanner,
            rng: Rng::new(),
            subscribers: Vec::new(),
            next_operation: 1,
            ticks: 0,
        }
    }

    /// Seeds the random source used by pattern draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rng::with_seed(seed);
        self
    }

    pub fn with_rng(mut self, rng: Rng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.config.blacklist
    }

    /// Read access to the world.
    pub fn world(&self) -> RwLockReadGuard<'_, G> {
        self.world.get()
    }

    /// Write access to the world, for host-side changes between ticks.
    pub fn world_mut(&self) -> RwLockWriteGuard<'_, G> {
        self.world.get_mut()
    }

    pub fn world_handle(&self) -> &MtResource<G> {
        &self.world
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn quota(&self) -> &Q {
        &self.quota
    }

    pub fn quota_mut(&mut self) -> &mut Q {
        &mut self.quota
    }

    pub fn selections(&self) -> &SelectionStore {
        &self.selections
    }

    pub fn selections_mut(&mut self) -> &mut SelectionStore {
        &mut self.selections
    }

    /// A copy of the actor's current selection (empty if none).
    pub fn selection_of(&self, actor: ActorId) -> Selection {
        self.selections.get(actor).copied().unwrap_or_default()
    }

    pub fn history(&self, actor: ActorId) -> Option<&UndoHistory> {
        self.histories.get(&actor)
    }

    /// Drops everything kept for an actor whose session ended. A live
    /// operation is flagged for cancellation and winds down on the next tick.
    pub fn end_session(&mut self, actor: ActorId) {
        self.selections.remove(actor);
        self.histories.remove(&actor);
        self.registry.request_cancel(actor);
    }

    /// Ticks processed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Opens a new event channel. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<EditEvent> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    fn emit(&mut self, event: EditEvent) {
        debug!("{event}");
        self.subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn next_id(&mut self) -> OperationId {
        let id = OperationId(self.next_operation);
        self.next_operation += 1;
        id
    }

    fn complete_selection(selection: &Selection) -> Result<(WorldId, Bounds)> {
        match (selection.world(), selection.bounds()) {
            (Some(world), Some(bounds)) => Ok((world, bounds)),
            _ => Err(EditError::SelectionIncomplete),
        }
    }

    fn check_quota(&self, actor: ActorId, world: WorldId, requested: u64) -> Result<()> {
        let limit = self.quota.quota_for(actor, world);
        if requested > u64::from(limit) {
            return Err(EditError::QuotaExceeded { requested, limit });
        }
        Ok(())
    }

    fn check_material(&self, actor: ActorId, material: Material, required: u64) -> Result<()> {
        if material.is_empty() || self.ledger.has(actor, material, required) {
            return Ok(());
        }
        Err(EditError::InsufficientMaterial {
            material,
            required,
            available: self.ledger.balance(actor, material),
        })
    }

    /// Checks whether an edit of `amount` units of `material` over
    /// `selection` would pass the selection, quota and material checks.
    /// Nothing is reserved.
    pub fn can_execute(
        &self,
        actor: ActorId,
        selection: &Selection,
        material: Material,
        amount: u64,
    ) -> Result<()> {
        let (world, bounds) = Self::complete_selection(selection)?;
        self.check_quota(actor, world, bounds.volume())?;
        self.check_material(actor, material, amount)
    }

    /// Fills the selection with `material`.
    pub fn execute_set(
        &mut self,
        actor: ActorId,
        selection: &Selection,
        material: Material,
    ) -> Result<EditOutcome> {
        self.execute(actor, selection, EditKind::Set(material))
    }

    /// Replaces every `from` block in the selection with `to`.
    pub fn execute_replace(
        &mut self,
        actor: ActorId,
        selection: &Selection,
        from: Material,
        to: Material,
    ) -> Result<EditOutcome> {
        self.execute(actor, selection, EditKind::Replace { from, to })
    }

    /// Fills the selection with materials drawn from `pattern`.
    pub fn execute_set_pattern(
        &mut self,
        actor: ActorId,
        selection: &Selection,
        pattern: &BlockPattern,
    ) -> Result<EditOutcome> {
        self.execute(actor, selection, EditKind::Pattern(pattern.clone()))
    }

    fn execute(
        &mut self,
        actor: ActorId,
        selection: &Selection,
        kind: EditKind,
    ) -> Result<EditOutcome> {
        if self.registry.is_active(actor) {
            return Err(EditError::OperationInProgress);
        }
        let (world, bounds) = Self::complete_selection(selection)?;
        if let EditKind::Pattern(pattern) = &kind {
            pattern.validate()?;
        }
        if let Some(material) = kind
            .targets()
            .into_iter()
            .find(|material| self.config.blacklist.contains(*material))
        {
            return Err(EditError::BlacklistedMaterial(material));
        }
        let volume = bounds.volume();
        if matches!(kind, EditKind::Replace { .. }) {
            let limit = self.config.execution.max_replace_volume;
            if volume > limit {
                return Err(EditError::SelectionTooLarge { volume, limit });
            }
        } else {
            self.check_quota(actor, world, volume)?;
        }

        let id = self.next_id();
        if volume > self.config.execution.direct_threshold && self.scanner.has_workers() {
            let task = RegionScanTask::new(
                self.world.clone(),
                world,
                bounds,
                kind.scan_filter(),
                self.config.blacklist.clone(),
                actor,
                id,
            );
            self.registry.insert_scanning(PendingEdit {
                id,
                actor,
                world,
                bounds,
                kind,
                cancelled: false,
            });
            self.scanner.publish_task(Box::new(task));
            info!("{id}: scanning {volume} position(s) for {actor} in the background");
            return Ok(EditOutcome::Scanning { operation: id });
        }

        let positions = {
            let grid = self.world.get();
            scan_region(&*grid, world, bounds, kind.scan_filter(), &self.config.blacklist)
        };
        self.launch(id, actor, world, kind, positions)
    }

    /// Finishes validation for scanned positions, reserves materials and
    /// runs or registers the job.
    fn launch(
        &mut self,
        id: OperationId,
        actor: ActorId,
        world: WorldId,
        kind: EditKind,
        positions: Vec<Position>,
    ) -> Result<EditOutcome> {
        let count = positions.len() as u64;
        if matches!(kind, EditKind::Replace { .. }) {
            self.check_quota(actor, world, count)?;
        }
        let requirements = kind.requirements(count);
        for (material, required) in &requirements {
            self.check_material(actor, *material, *required)?;
        }
        self.reserve(actor, &requirements)?;

        let mode = if count > self.config.execution.direct_threshold {
            ExecutionMode::Incremental
        } else {
            ExecutionMode::Direct
        };
        let total = positions.len();
        let mut job = EditJob::new(
            id,
            actor,
            world,
            kind,
            mode,
            positions,
            Reservation::new(requirements),
            self.rng.fork(),
        );

        match mode {
            ExecutionMode::Direct => {
                {
                    let mut grid = self.world.get_mut();
                    job.run_batch(&mut *grid, &self.config.blacklist, usize::MAX);
                }
                Ok(EditOutcome::Completed(self.complete(job.finish())))
            }
            ExecutionMode::Incremental => {
                info!("{id}: {} over {total} position(s) queued for {actor}", job.kind());
                self.registry.insert_running(job);
                self.emit(EditEvent::Started {
                    actor,
                    operation: id,
                    total,
                });
                Ok(EditOutcome::Started { operation: id, total })
            }
        }
    }

    /// Debits every requirement or none of them.
    fn reserve(&mut self, actor: ActorId, requirements: &BTreeMap<Material, u64>) -> Result<()> {
        let mut debited = Vec::with_capacity(requirements.len());
        for (material, amount) in requirements {
            if self.ledger.debit(actor, *material, *amount) {
                debited.push((*material, *amount));
                continue;
            }
            for (material, amount) in debited {
                self.ledger.credit(actor, material, amount);
            }
            return Err(EditError::InsufficientMaterial {
                material: *material,
                required: *amount,
                available: self.ledger.balance(actor, *material),
            });
        }
        Ok(())
    }

    fn complete(&mut self, finished: FinishedJob) -> EditReport {
        let FinishedJob {
            id,
            actor,
            world,
            kind,
            mode,
            affected,
            skipped,
            consumed,
            unused,
            returned,
            undo,
        } = finished;

        for (material, amount) in &unused {
            self.ledger.credit(actor, *material, *amount);
        }
        for (material, amount) in &returned {
            self.ledger.credit(actor, *material, *amount);
        }
        if affected > 0 {
            let depth = self.config.execution.undo_depth;
            self.histories
                .entry(actor)
                .or_insert_with(|| UndoHistory::new(depth))
                .push(undo);
        }

        let report = EditReport {
            operation: id,
            actor,
            world,
            kind,
            mode,
            affected,
            skipped,
            consumed,
            refunded: unused,
            returned,
        };
        info!("{id}: {report}");
        self.emit(EditEvent::Completed {
            actor,
            report: report.clone(),
        });
        report
    }

    fn cancel_job(&mut self, finished: FinishedJob) {
        // written blocks stay; their materials are spent and nothing is returned
        for (material, amount) in &finished.unused {
            self.ledger.credit(finished.actor, *material, *amount);
        }
        info!(
            "{}: cancelled after {} block(s), refunding {:?}",
            finished.id, finished.affected, finished.unused
        );
        self.emit(EditEvent::Cancelled {
            actor: finished.actor,
            operation: finished.id,
            written: finished.affected,
            refunded: finished.unused,
        });
    }

    /// Reverts the actor's most recent edit.
    ///
    /// Each captured position gets its prior state back. The block removed by
    /// the restore is credited to the actor if it is not air. Positions the
    /// world cannot provide or write are skipped.
    pub fn undo(&mut self, actor: ActorId) -> Result<UndoReport> {
        if self.registry.is_active(actor) {
            return Err(EditError::OperationInProgress);
        }
        let record = self
            .histories
            .get_mut(&actor)
            .and_then(UndoHistory::pop)
            .ok_or(EditError::NothingToUndo)?;
        let world = record.world();

        let mut report = UndoReport::default();
        let mut grid = self.world.get_mut();
        for (pos, prior) in record {
            let Some(current) = grid.block_at(world, pos) else {
                warn!("Undo for {actor}: skipping {pos:?}, block unavailable");
                report.skipped += 1;
                continue;
            };
            if !grid.set_block(world, pos, prior) {
                warn!("Undo for {actor}: write at {pos:?} failed");
                report.skipped += 1;
                continue;
            }
            if !current.is_empty() {
                self.ledger.credit(actor, current.material, 1);
                *report.credited.entry(current.material).or_default() += 1;
            }
            report.restored += 1;
        }
        drop(grid);

        info!("Undo for {actor}: {report}");
        Ok(report)
    }

    /// Flags the actor's live operation for cancellation. It stops at the
    /// start of the next tick.
    ///
    /// # Returns
    /// `false` if the actor has no live operation or it is already flagged.
    pub fn cancel(&mut self, actor: ActorId) -> bool {
        let flagged = self.registry.request_cancel(actor);
        if flagged {
            info!("Cancellation requested for {actor}");
        }
        flagged
    }

    pub fn has_active_operation(&self, actor: ActorId) -> bool {
        self.registry.is_active(actor)
    }

    /// `(processed, total)` positions of the actor's live operation.
    pub fn operation_progress(&self, actor: ActorId) -> Option<(u64, u64)> {
        self.registry.progress(actor)
    }

    /// Advances every live operation by one tick.
    ///
    /// Collects finished scans, hands queued scans to idle workers, then runs
    /// one batch of every due job in registration order.
    ///
    /// # Returns
    /// The number of operations still live.
    pub fn tick(&mut self) -> usize {
        self.ticks += 1;

        for scan in self.scanner.drain_completed() {
            self.resume_scan(scan);
        }
        self.scanner.process_queued_tasks();

        for actor in self.registry.run_queue() {
            self.step(actor);
        }
        self.registry.len()
    }

    fn resume_scan(&mut self, scan: RegionScan) {
        let RegionScan {
            actor,
            operation,
            positions,
        } = scan;
        let Some(pending) = self.registry.take_scanning(actor, operation) else {
            debug!("{operation}: scan result has no waiting edit");
            return;
        };
        if pending.cancelled {
            info!("{operation}: cancelled while scanning");
            self.emit(EditEvent::Cancelled {
                actor,
                operation,
                written: 0,
                refunded: BTreeMap::new(),
            });
            return;
        }
        let Some(positions) = positions else {
            warn!("{operation}: region scan aborted");
            self.emit(EditEvent::Failed {
                actor,
                operation,
                error: EditError::ScanAborted,
            });
            return;
        };
        if let Err(error) = self.launch(operation, actor, pending.world, pending.kind, positions) {
            warn!("{operation}: {error}");
            self.emit(EditEvent::Failed {
                actor,
                operation,
                error,
            });
        }
    }

    fn step(&mut self, actor: ActorId) {
        let batch_size = self.config.execution.batch_size.max(1);
        let interval = self.config.execution.batch_interval_ticks;
        let progress_interval = self.config.execution.progress_interval_percent;

        let Some(job) = self.registry.running_mut(actor) else {
            return;
        };
        if job.is_cancelled() {
            if let Some(job) = self.registry.remove_running(actor) {
                self.cancel_job(job.finish());
            }
            return;
        }
        if !job.is_due() {
            return;
        }

        let status = {
            let mut grid = self.world.get_mut();
            job.run_batch(&mut *grid, &self.config.blacklist, batch_size)
        };
        job.wait_ticks(interval);
        let progress = job
            .take_progress(progress_interval)
            .map(|percent| (job.id(), percent, job.cursor(), job.total()));

        if let Some((operation, percent, processed, total)) = progress {
            self.emit(EditEvent::Progress {
                actor,
                operation,
                percent,
                processed,
                total,
            });
        }
        if status == JobStatus::Done {
            if let Some(job) = self.registry.remove_running(actor) {
                self.complete(job.finish());
            }
        }
    }
}
