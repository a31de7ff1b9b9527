//! # World Module
//!
//! This module provides the `World` struct, the in-memory [`BlockGrid`] the
//! editor ships with. It manages a sparse collection of chunks across any
//! number of worlds.
//!
//! ## Architecture
//!
//! Only loaded chunks are kept in memory. Reads from an unloaded chunk, or
//! from outside the vertical build limits, report that the world cannot
//! provide a block there, which the editor treats as "skip this position".
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map keyed by world and chunk position
//! - Block access inside a chunk is O(1)

use std::collections::HashMap;

use cgmath::Point3;

use super::block::BlockState;
use super::chunk::{Chunk, ChunkGenerator, CHUNK_DIMENSION};
use super::grid::{BlockGrid, Position, WorldId};

/// Lowest block y coordinate a world accepts by default.
pub const DEFAULT_MIN_Y: i32 = -64;
/// Highest block y coordinate a world accepts by default.
pub const DEFAULT_MAX_Y: i32 = 319;

/// A sparse, chunked voxel world.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_edit::{BlockGrid, BlockState, ChunkGenerator, Material, World, WorldId};
///
/// let mut world = World::new();
/// let overworld = WorldId(0);
/// world.load_chunk(overworld, Point3::new(0, 0, 0), ChunkGenerator::Empty);
///
/// let pos = Point3::new(1, 2, 3);
/// assert!(world.set_block(overworld, pos, BlockState::new(Material::STONE)));
/// assert_eq!(world.block_at(overworld, pos), Some(BlockState::new(Material::STONE)));
///
/// // Unloaded chunks cannot provide blocks.
/// assert_eq!(world.block_at(overworld, Point3::new(100, 0, 0)), None);
/// ```
pub struct World {
    chunks: HashMap<(WorldId, Point3<i32>), Chunk>,
    min_y: i32,
    max_y: i32,
}

impl World {
    /// Creates a new, empty world with the default build limits.
    pub fn new() -> Self {
        Self::with_height_limits(DEFAULT_MIN_Y, DEFAULT_MAX_Y)
    }

    /// Creates a new, empty world that only accepts `min_y..=max_y`.
    pub fn with_height_limits(min_y: i32, max_y: i32) -> Self {
        World {
            chunks: HashMap::new(),
            min_y,
            max_y,
        }
    }

    /// The chunk containing a block position.
    pub fn chunk_position_of(pos: Position) -> Point3<i32> {
        Point3::new(
            pos.x.div_euclid(CHUNK_DIMENSION),
            pos.y.div_euclid(CHUNK_DIMENSION),
            pos.z.div_euclid(CHUNK_DIMENSION),
        )
    }

    fn local_of(pos: Position) -> (usize, usize, usize) {
        (
            pos.x.rem_euclid(CHUNK_DIMENSION) as usize,
            pos.y.rem_euclid(CHUNK_DIMENSION) as usize,
            pos.z.rem_euclid(CHUNK_DIMENSION) as usize,
        )
    }

    /// Generates and loads a chunk if one is not already loaded there.
    pub fn load_chunk(&mut self, world: WorldId, position: Point3<i32>, generator: ChunkGenerator) {
        self.chunks
            .entry((world, position))
            .or_insert_with(|| Chunk::generate(position, generator));
    }

    /// Loads every chunk overlapping the block box `min..=max`.
    pub fn load_area(
        &mut self,
        world: WorldId,
        min: Position,
        max: Position,
        generator: ChunkGenerator,
    ) {
        let low = Self::chunk_position_of(min);
        let high = Self::chunk_position_of(max);
        for x in low.x..=high.x {
            for y in low.y..=high.y {
                for z in low.z..=high.z {
                    self.load_chunk(world, Point3::new(x, y, z), generator);
                }
            }
        }
    }

    /// Drops a chunk from memory. Returns the chunk if it was loaded.
    pub fn unload_chunk(&mut self, world: WorldId, position: Point3<i32>) -> Option<Chunk> {
        self.chunks.remove(&(world, position))
    }

    /// Whether the chunk at `position` is loaded.
    pub fn is_chunk_loaded(&self, world: WorldId, position: Point3<i32>) -> bool {
        self.chunks.contains_key(&(world, position))
    }

    /// Retrieves a reference to a loaded chunk.
    pub fn get_chunk_at(&self, world: WorldId, position: Point3<i32>) -> Option<&Chunk> {
        self.chunks.get(&(world, position))
    }

    /// Number of loaded chunks across all worlds.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    fn in_height_limits(&self, pos: Position) -> bool {
        (self.min_y..=self.max_y).contains(&pos.y)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockGrid for World {
    fn block_at(&self, world: WorldId, pos: Position) -> Option<BlockState> {
        if !self.in_height_limits(pos) {
            return None;
        }
        let chunk = self.chunks.get(&(world, Self::chunk_position_of(pos)))?;
        let (cx, cy, cz) = Self::local_of(pos);
        Some(chunk.get_local(cx, cy, cz))
    }

    fn set_block(&mut self, world: WorldId, pos: Position, state: BlockState) -> bool {
        if !self.in_height_limits(pos) {
            return false;
        }
        match self.chunks.get_mut(&(world, Self::chunk_position_of(pos))) {
            Some(chunk) => {
                let (cx, cy, cz) = Self::local_of(pos);
                chunk.set_local(cx, cy, cz, state);
                true
            }
            None => false,
        }
    }
}
