//! # Region Scan Task
//!
//! Before an edit starts, its region is scanned for the positions it will
//! touch: every non-blacklisted block for set and pattern edits, every
//! matching block for replace. The scan only reads the world, so large
//! regions can be scanned on a worker thread while the tick thread keeps
//! running. A worker holds the world's read lock for one x/y row at a time,
//! so a writer waits at most one row. The result travels back as a
//! [`RegionScan`] and the edit is validated and started on the tick thread.

use cgmath::Point3;

use crate::core::MtResource;
use crate::engine_state::operations::blacklist::Blacklist;
use crate::engine_state::operations::events::OperationId;
use crate::engine_state::operations::job::ScanFilter;
use crate::engine_state::selection::Bounds;
use crate::engine_state::task_management::task::Task;
use crate::engine_state::voxels::grid::{BlockGrid, Position, WorldId};
use crate::engine_state::ActorId;

/// Collects, in iteration order, the positions of `bounds` the filter
/// accepts. Positions the grid cannot provide are left out.
pub fn scan_region<G: BlockGrid + ?Sized>(
    grid: &G,
    world: WorldId,
    bounds: Bounds,
    filter: ScanFilter,
    blacklist: &Blacklist,
) -> Vec<Position> {
    bounds
        .iter()
        .filter(|pos| {
            grid.block_at(world, *pos)
                .is_some_and(|state| filter.accepts(&state, blacklist))
        })
        .collect()
}

/// The outcome of a background scan.
pub struct RegionScan {
    pub actor: ActorId,
    pub operation: OperationId,
    /// `None` if the scan was abandoned.
    pub positions: Option<Vec<Position>>,
}

/// Scans a region on a worker thread.
pub struct RegionScanTask<G: BlockGrid + Send + Sync> {
    grid: MtResource<G>,
    world: WorldId,
    bounds: Bounds,
    filter: ScanFilter,
    blacklist: Blacklist,
    actor: ActorId,
    operation: OperationId,
}

impl<G: BlockGrid + Send + Sync + 'static> RegionScanTask<G> {
    pub fn new(
        grid: MtResource<G>,
        world: WorldId,
        bounds: Bounds,
        filter: ScanFilter,
        blacklist: Blacklist,
        actor: ActorId,
        operation: OperationId,
    ) -> Self {
        RegionScanTask {
            grid,
            world,
            bounds,
            filter,
            blacklist,
            actor,
            operation,
        }
    }
}

impl<G: BlockGrid + Send + Sync + 'static> Task for RegionScanTask<G> {
    type Output = RegionScan;

    fn process(&self) -> RegionScan {
        let Bounds { min, max } = self.bounds;
        let mut positions = Vec::new();
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                let row = Bounds::spanning(Point3::new(x, y, min.z), Point3::new(x, y, max.z));
                let grid = self.grid.get();
                positions.extend(scan_region(
                    &*grid,
                    self.world,
                    row,
                    self.filter,
                    &self.blacklist,
                ));
            }
        }
        RegionScan {
            actor: self.actor,
            operation: self.operation,
            positions: Some(positions),
        }
    }

    fn abandoned(&self) -> RegionScan {
        RegionScan {
            actor: self.actor,
            operation: self.operation,
            positions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::{BlockState, Material};
    use crate::engine_state::voxels::chunk::ChunkGenerator;
    use crate::engine_state::voxels::world::World;
    use std::thread;
    use std::time::Duration;
    use web_time::Instant;

    const OVERWORLD: WorldId = WorldId(0);

    fn world_with_dirt_column() -> World {
        let mut world = World::new();
        world.load_chunk(OVERWORLD, Point3::new(0, 0, 0), ChunkGenerator::Empty);
        for y in 0..4 {
            world.set_block(OVERWORLD, Point3::new(0, y, 0), BlockState::new(Material::DIRT));
        }
        world.set_block(OVERWORLD, Point3::new(1, 0, 0), BlockState::new(Material::BEDROCK));
        world
    }

    #[test]
    fn matching_scan_finds_only_the_source_material() {
        let world = world_with_dirt_column();
        let bounds = Bounds::spanning(Point3::new(0, 0, 0), Point3::new(1, 3, 0));
        let found = scan_region(
            &world,
            OVERWORLD,
            bounds,
            ScanFilter::Matching(Material::DIRT),
            &Blacklist::standard(),
        );
        assert_eq!(found.len(), 4);
        assert!(found.windows(2).all(|pair| pair[0].y < pair[1].y));
    }

    #[test]
    fn applicable_scan_skips_blacklisted_and_unloaded_blocks() {
        let world = world_with_dirt_column();
        // x = -1 lies in an unloaded chunk
        let bounds = Bounds::spanning(Point3::new(-1, 0, 0), Point3::new(1, 0, 0));
        let blacklist = Blacklist::standard();
        let found = scan_region(&world, OVERWORLD, bounds, ScanFilter::Applicable, &blacklist);
        assert_eq!(found, vec![Point3::new(0, 0, 0)]);
    }

    #[test]
    fn blacklisted_source_matches_nothing() {
        let world = world_with_dirt_column();
        let bounds = Bounds::spanning(Point3::new(0, 0, 0), Point3::new(0, 3, 0));
        let blacklist: Blacklist = [Material::DIRT].into_iter().collect();
        let filter = ScanFilter::Matching(Material::DIRT);
        let found = scan_region(&world, OVERWORLD, bounds, filter, &blacklist);
        assert!(found.is_empty());
    }

    #[test]
    fn task_reads_through_the_shared_handle() {
        let grid = MtResource::new(world_with_dirt_column());
        let bounds = Bounds::spanning(Point3::new(0, 0, 0), Point3::new(0, 3, 0));
        let task = RegionScanTask::new(
            grid,
            OVERWORLD,
            bounds,
            ScanFilter::Matching(Material::DIRT),
            Blacklist::new(),
            ActorId(1),
            OperationId(2),
        );
        let scan = task.process();
        assert_eq!(scan.operation, OperationId(2));
        assert_eq!(scan.positions.map(|p| p.len()), Some(4));
        assert!(task.abandoned().positions.is_none());
    }

    /// A world whose reads take a millisecond each.
    struct SlowWorld(World);

    impl BlockGrid for SlowWorld {
        fn block_at(&self, world: WorldId, pos: Position) -> Option<BlockState> {
            thread::sleep(Duration::from_millis(1));
            self.0.block_at(world, pos)
        }

        fn set_block(&mut self, world: WorldId, pos: Position, state: BlockState) -> bool {
            self.0.set_block(world, pos, state)
        }
    }

    #[test]
    fn writers_are_not_blocked_for_the_whole_scan() {
        let grid = MtResource::new(SlowWorld(world_with_dirt_column()));
        // 512 reads, about half a second of scanning
        let bounds = Bounds::spanning(Point3::new(0, 0, 0), Point3::new(7, 7, 7));
        let task = RegionScanTask::new(
            grid.clone(),
            OVERWORLD,
            bounds,
            ScanFilter::Applicable,
            Blacklist::standard(),
            ActorId(1),
            OperationId(3),
        );
        let worker = thread::spawn(move || task.process());

        thread::sleep(Duration::from_millis(30));
        let started = Instant::now();
        grid.get_mut()
            .set_block(OVERWORLD, Point3::new(7, 7, 7), BlockState::new(Material::STONE));
        assert!(started.elapsed() < Duration::from_millis(100));

        let scan = worker.join().unwrap();
        // everything but the bedrock at (1, 0, 0)
        assert_eq!(scan.positions.map(|p| p.len()), Some(511));
    }
}
