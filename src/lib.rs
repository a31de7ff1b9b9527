#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Edit
//!
//! A region editor for voxel worlds. An actor marks a box with two corners
//! and fills it with one material, replaces one material with another, or
//! fills it with a weighted random pattern. Every edit is paid for from a
//! virtual material inventory, capped by a rank-based quota, and reversible
//! through a bounded undo history.
//!
//! Small edits run in one synchronous pass. Large edits run a bounded batch
//! per host tick so the host keeps simulating, and can be cancelled. Both
//! paths share one executor, so they change the same blocks and account for
//! materials the same way.
//!
//! ## Key Modules
//!
//! * `core` - Shared-ownership primitives (`MtResource`)
//! * `engine_state` - The world, selections, operations, inventory and ranks
//! * `config` - JSON configuration
//! * `error` - Error types
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_edit::{
//!     ActorId, ChunkGenerator, EditConfig, EditOutcome, FixedQuota, Material, MaterialLedger,
//!     RegionEditor, Selection, VirtualInventory, World, WorldId,
//! };
//!
//! let overworld = WorldId(0);
//! let mut world = World::new();
//! world.load_chunk(overworld, Point3::new(0, 0, 0), ChunkGenerator::Empty);
//!
//! let alice = ActorId(1);
//! let mut inventory = VirtualInventory::new();
//! inventory.credit(alice, Material::STONE, 8);
//!
//! let mut editor = RegionEditor::new(world, inventory, FixedQuota(100), EditConfig::default());
//! let selection = Selection::from_corners(overworld, Point3::new(0, 0, 0), Point3::new(1, 1, 1));
//!
//! match editor.execute_set(alice, &selection, Material::STONE).unwrap() {
//!     EditOutcome::Completed(report) => assert_eq!(report.affected, 8),
//!     other => panic!("expected a direct edit, got {other:?}"),
//! }
//! assert_eq!(editor.ledger().balance(alice, Material::STONE), 0);
//! ```
//!
//! Hosts call [`RegionEditor::tick`] once per simulation step to advance
//! incremental edits, and read progress from [`RegionEditor::subscribe`].

use std::thread;
use std::time::Duration;

use cgmath::Point3;
use log::{error, info};

pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

pub use config::{EditConfig, ExecutionConfig, WorldLimit};
pub use engine_state::inventory::{MaterialLedger, VirtualInventory};
pub use engine_state::operations::blacklist::Blacklist;
pub use engine_state::operations::events::{
    EditEvent, EditOutcome, EditReport, ExecutionMode, OperationId, UndoReport,
};
pub use engine_state::operations::job::EditKind;
pub use engine_state::operations::pattern::{BlockPattern, PatternEntry};
pub use engine_state::operations::undo::{UndoHistory, UndoRecord};
pub use engine_state::operations::RegionEditor;
pub use engine_state::ranks::{
    FixedQuota, PermissionSet, PermissionSource, QuotaResolver, RankQuota, RankTable, RankTier,
};
pub use engine_state::selection::{Bounds, Selection, SelectionStore};
pub use engine_state::voxels::block::{BlockState, Material};
pub use engine_state::voxels::chunk::{Chunk, ChunkGenerator};
pub use engine_state::voxels::grid::{BlockGrid, Position, WorldId};
pub use engine_state::voxels::world::World;
pub use engine_state::ActorId;
pub use error::{ConfigError, EditError, Result};

/// Seed of the demo world and its pattern draws.
pub const DEMO_SEED: u32 = 2024;

/// Initializes `env_logger` on stdout, filtered by `RUST_LOG`.
///
/// Calling it again after a logger is installed does nothing.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}

type DemoEditor = RegionEditor<World, VirtualInventory, RankQuota<PermissionSet>>;

/// Runs the editor against a generated world: a direct set, a background
/// scanned replace, an undo, a pattern fill and a cancelled large edit.
pub fn run() {
    init_logging();
    info!("Logger initialized");

    let overworld = WorldId(0);
    let builder = ActorId(1);

    let mut world = World::new();
    world.load_area(
        overworld,
        Point3::new(-16, -16, -16),
        Point3::new(31, 15, 31),
        ChunkGenerator::Perlin { seed: DEMO_SEED },
    );
    info!("Generated {} chunks", world.loaded_chunk_count());

    let mut config = EditConfig::default();
    config.execution.scan_workers = 1;
    config.ranks.tiers.insert(0, RankTier::new("Architect", 50_000));

    let mut permissions = PermissionSet::new();
    permissions.grant(builder, "voxeledit.rank.architect");
    let quota = RankQuota::from_config(&config, permissions);

    let mut inventory = VirtualInventory::new();
    for (material, amount) in [
        (Material::STONE, 20_000),
        (Material::DIRT, 5_000),
        (Material::GLASS, 500),
        (Material::OAK_PLANKS, 20_000),
    ] {
        inventory.credit(builder, material, amount);
    }

    let mut editor: DemoEditor =
        RegionEditor::new(world, inventory, quota, config).with_seed(u64::from(DEMO_SEED));
    let events = editor.subscribe();

    let drive = |editor: &mut DemoEditor| {
        while editor.tick() > 0 {
            for event in events.try_iter() {
                println!("{event}");
            }
            thread::sleep(Duration::from_millis(1));
        }
        for event in events.try_iter() {
            println!("{event}");
        }
    };

    editor
        .selections_mut()
        .set_first_position(builder, overworld, Point3::new(0, 4, 0));
    editor
        .selections_mut()
        .set_second_position(builder, overworld, Point3::new(2, 6, 2));
    let selection = editor.selection_of(builder);
    report(editor.execute_set(builder, &selection, Material::GLASS));

    let terrain = Selection::from_corners(overworld, Point3::new(0, 0, 0), Point3::new(11, 11, 11));
    report(editor.execute_replace(builder, &terrain, Material::DIRT, Material::STONE));
    drive(&mut editor);

    match editor.undo(builder) {
        Ok(undo) => println!("{undo}"),
        Err(err) => error!("Undo failed: {err}"),
    }

    let pattern = BlockPattern::parse_lenient("stone:70,dirt:30");
    report(editor.execute_set_pattern(builder, &selection, &pattern));

    let large =
        Selection::from_corners(overworld, Point3::new(-16, -16, -16), Point3::new(15, -1, 15));
    report(editor.execute_set(builder, &large, Material::OAK_PLANKS));
    for _ in 0..3 {
        editor.tick();
        thread::sleep(Duration::from_millis(1));
    }
    editor.cancel(builder);
    drive(&mut editor);

    info!(
        "Remaining oak planks: {}",
        editor.ledger().balance(builder, Material::OAK_PLANKS)
    );
}

fn report(result: Result<EditOutcome>) {
    match result {
        Ok(EditOutcome::Completed(report)) => println!("{report}"),
        Ok(EditOutcome::Started { operation, total }) => {
            println!("{operation} started over {total} block(s)")
        }
        Ok(EditOutcome::Scanning { operation }) => println!("{operation} is scanning its region"),
        Err(err) => error!("Edit refused: {err}"),
    }
}
