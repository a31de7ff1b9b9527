//! # Chunk Module
//!
//! This module provides the `Chunk` struct, a 16x16x16 block of voxel data,
//! together with the generators used to populate chunks.
//!
//! ## Storage
//!
//! `blocks` holds one packed `u16` per block (material id high byte,
//! auxiliary data low byte), in x-fastest, then y, then z order.

use cgmath::Point3;
use noise::{NoiseFn, Perlin};

use super::block::{BlockState, Material};

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Threshold above which Perlin noise is considered solid for terrain generation.
pub const PERLIN_POSITIVE_THRESHOLD: f64 = 0.2;
/// Threshold below which Perlin noise is considered solid for terrain generation.
pub const PERLIN_NEGATIVE_THRESHOLD: f64 = -0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;

/// How a freshly loaded chunk is populated.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ChunkGenerator {
    /// All air.
    Empty,
    /// Every block set to one material.
    Solid(Material),
    /// Perlin-noise terrain: stone below y = 0, dirt above.
    Perlin { seed: u32 },
}

/// A 16x16x16 collection of blocks, addressed by chunk-local coordinates.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,
    /// Packed block states, see [`BlockState::pack`].
    blocks: Vec<u16>,
}

impl Chunk {
    /// Creates a chunk filled with air.
    pub fn empty(position: Point3<i32>) -> Self {
        Chunk {
            position,
            blocks: vec![BlockState::AIR.pack(); CHUNK_SIZE as usize],
        }
    }

    /// Creates a chunk with every block set to `material`.
    pub fn solid(position: Point3<i32>, material: Material) -> Self {
        Chunk {
            position,
            blocks: vec![BlockState::new(material).pack(); CHUNK_SIZE as usize],
        }
    }

    /// Generates a chunk using 3D Perlin noise.
    ///
    /// A block is solid when the noise sample falls outside the
    /// `PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD` band, which
    /// carves caves and overhangs into otherwise solid ground.
    pub fn perlin(position: Point3<i32>, seed: u32) -> Self {
        let perlin = Perlin::new(seed);
        let mut chunk = Chunk::empty(position);

        for k in 0..CHUNK_DIMENSION {
            for j in 0..CHUNK_DIMENSION {
                for i in 0..CHUNK_DIMENSION {
                    let world_pos = Point3::new(
                        i + CHUNK_DIMENSION * position.x,
                        j + CHUNK_DIMENSION * position.y,
                        k + CHUNK_DIMENSION * position.z,
                    );
                    let sample = perlin.get(Self::to_perlin_pos(world_pos, PERLIN_SCALE_FACTOR));
                    if !(PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD).contains(&sample) {
                        let material = if world_pos.y < 0 {
                            Material::STONE
                        } else {
                            Material::DIRT
                        };
                        let state = BlockState::new(material);
                        chunk.set_local(i as usize, j as usize, k as usize, state);
                    }
                }
            }
        }

        chunk
    }

    /// Builds a chunk with the given generator.
    pub fn generate(position: Point3<i32>, generator: ChunkGenerator) -> Self {
        match generator {
            ChunkGenerator::Empty => Chunk::empty(position),
            ChunkGenerator::Solid(material) => Chunk::solid(position, material),
            ChunkGenerator::Perlin { seed } => Chunk::perlin(position, seed),
        }
    }

    fn to_perlin_pos(pos: Point3<i32>, scale_factor: f64) -> [f64; 3] {
        [
            pos.x as f64 * scale_factor,
            pos.y as f64 * scale_factor,
            pos.z as f64 * scale_factor,
        ]
    }

    fn index(cx: usize, cy: usize, cz: usize) -> usize {
        cx + CHUNK_DIMENSION as usize * cy + CHUNK_PLANE_SIZE as usize * cz
    }

    /// Gets the block at chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if a coordinate is not below `CHUNK_DIMENSION`.
    pub fn get_local(&self, cx: usize, cy: usize, cz: usize) -> BlockState {
        BlockState::unpack(self.blocks[Self::index(cx, cy, cz)])
    }

    /// Sets the block at chunk-relative coordinates.
    ///
    /// # Panics
    /// Panics if a coordinate is not below `CHUNK_DIMENSION`.
    pub fn set_local(&mut self, cx: usize, cy: usize, cz: usize, state: BlockState) {
        self.blocks[Self::index(cx, cy, cz)] = state.pack();
    }
}
