#![allow(dead_code)]

use std::collections::HashMap;

use cgmath::Point3;
use voxel_edit::{
    ActorId, BlockGrid, BlockState, Bounds, ChunkGenerator, EditConfig, EditEvent, FixedQuota,
    Material, Position, RegionEditor, Selection, UndoRecord, VirtualInventory, World, WorldId,
};

pub const OVERWORLD: WorldId = WorldId(0);
pub const ALICE: ActorId = ActorId(1);
pub const BOB: ActorId = ActorId(2);

pub type TestEditor = RegionEditor<World, VirtualInventory, FixedQuota>;

pub fn config(direct_threshold: u64, batch_size: usize) -> EditConfig {
    let mut config = EditConfig::default();
    config.execution.direct_threshold = direct_threshold;
    config.execution.batch_size = batch_size;
    config
}

/// Two empty chunks side by side along x: blocks 0..=31, 0..=15, 0..=15.
pub fn empty_world() -> World {
    let mut world = World::new();
    world.load_area(
        OVERWORLD,
        Point3::new(0, 0, 0),
        Point3::new(31, 15, 15),
        ChunkGenerator::Empty,
    );
    world
}

/// Stone at y 0..=1, dirt at y 2..=3, air above, one bedrock block at the
/// origin.
pub fn layered_world() -> World {
    let mut world = empty_world();
    for x in 0..32 {
        for z in 0..16 {
            for y in 0..4 {
                let material = if y < 2 { Material::STONE } else { Material::DIRT };
                world.set_block(OVERWORLD, Point3::new(x, y, z), BlockState::new(material));
            }
        }
    }
    world.set_block(OVERWORLD, Point3::new(0, 0, 0), BlockState::new(Material::BEDROCK));
    world
}

pub fn editor(world: World, config: EditConfig) -> TestEditor {
    RegionEditor::new(world, VirtualInventory::new(), FixedQuota(100_000), config).with_seed(7)
}

pub fn selection(min: (i32, i32, i32), max: (i32, i32, i32)) -> Selection {
    Selection::from_corners(
        OVERWORLD,
        Point3::new(min.0, min.1, min.2),
        Point3::new(max.0, max.1, max.2),
    )
}

pub fn snapshot(editor: &TestEditor, bounds: Bounds) -> Vec<Option<BlockState>> {
    let world = editor.world();
    bounds.iter().map(|pos| world.block_at(OVERWORLD, pos)).collect()
}

pub fn count_material(editor: &TestEditor, bounds: Bounds, material: Material) -> usize {
    snapshot(editor, bounds)
        .into_iter()
        .filter(|state| state.map(|s| s.material) == Some(material))
        .count()
}

pub fn captured(record: &UndoRecord) -> HashMap<Position, BlockState> {
    record.iter().map(|(pos, state)| (*pos, *state)).collect()
}

/// Ticks until no operation is live.
pub fn run_to_idle(editor: &mut TestEditor) {
    for _ in 0..50_000 {
        if editor.tick() == 0 {
            return;
        }
        std::thread::sleep(std::time::Duration::from_micros(200));
    }
    panic!("operations never finished");
}

pub fn drain(events: &std::sync::mpsc::Receiver<EditEvent>) -> Vec<EditEvent> {
    events.try_iter().collect()
}
