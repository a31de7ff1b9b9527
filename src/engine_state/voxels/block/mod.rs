//! # Block Module
//!
//! This module provides the block value type stored in the world and captured
//! by undo records.

use serde::{Deserialize, Serialize};

pub use material::Material;

pub mod material;

/// The underlying integer type used to represent materials in chunk storage.
pub type MaterialId = u8;

/// The complete state of one block: its material plus opaque auxiliary data
/// (orientation, variant, growth stage...).
///
/// The editor never interprets `data`. It compares states for equality and
/// restores them verbatim on undo, which is all it needs for exact
/// restoration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    /// The material of this block.
    pub material: Material,
    /// Auxiliary state, preserved bit for bit.
    pub data: u8,
}

impl BlockState {
    /// An air block.
    pub const AIR: BlockState = BlockState {
        material: Material::AIR,
        data: 0,
    };

    /// Creates a block of `material` with default auxiliary data.
    pub fn new(material: Material) -> Self {
        BlockState { material, data: 0 }
    }

    /// Creates a block of `material` carrying `data`.
    pub fn with_data(material: Material, data: u8) -> Self {
        BlockState { material, data }
    }

    /// Whether the block is empty space.
    pub fn is_empty(&self) -> bool {
        self.material.is_empty()
    }

    /// Packs the state into the compact form stored by chunks: material id in
    /// the high byte, auxiliary data in the low byte.
    pub fn pack(self) -> u16 {
        ((self.material.id() as u16) << 8) | self.data as u16
    }

    /// Reverses [`BlockState::pack`]. Unknown material ids decode as air.
    pub fn unpack(packed: u16) -> Self {
        let material = Material::from_id((packed >> 8) as MaterialId).unwrap_or(Material::AIR);
        BlockState {
            material,
            data: (packed & 0xFF) as u8,
        }
    }
}

impl Default for BlockState {
    fn default() -> Self {
        BlockState::AIR
    }
}

impl From<Material> for BlockState {
    fn from(material: Material) -> Self {
        BlockState::new(material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_keeps_auxiliary_data() {
        let state = BlockState::with_data(Material::OAK_LOG, 0b1010_0110);
        assert_eq!(BlockState::unpack(state.pack()), state);
    }

    #[test]
    fn packed_air_is_zero() {
        assert_eq!(BlockState::AIR.pack(), 0);
        assert_eq!(BlockState::unpack(0), BlockState::AIR);
    }

    #[test]
    fn unknown_material_id_decodes_as_air() {
        let decoded = BlockState::unpack(0xFE07);
        assert_eq!(decoded.material, Material::AIR);
        assert_eq!(decoded.data, 7);
    }
}
