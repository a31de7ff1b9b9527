//! # Material Module
//!
//! This module defines the materials a block can be made of. A material is also
//! the unit counted by the material ledger, so the same identifier shows up in
//! the world, in patterns, and in inventories.

use std::fmt;

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::MaterialId;

/// Enumerates all block materials known to the editor.
///
/// The discriminant is the compact id stored in chunks; `FromPrimitive` turns
/// it back into a `Material`. Variant names are the canonical upper-case names
/// used in configuration files.
#[allow(non_camel_case_types)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Material {
    /// The empty material. Never counted as a resource.
    AIR,
    STONE,
    COBBLESTONE,
    DIRT,
    GRASS_BLOCK,
    SAND,
    GRAVEL,
    OAK_LOG,
    OAK_PLANKS,
    GLASS,
    BRICKS,
    WHITE_WOOL,
    GLOWSTONE,
    WATER,
    BEDROCK,
    COMMAND_BLOCK,
    BARRIER,
    END_PORTAL_FRAME,
}

/// Lower-case name lookup used when parsing user input and patterns.
static MATERIAL_NAMES: phf::Map<&'static str, Material> = phf::phf_map! {
    "air" => Material::AIR,
    "stone" => Material::STONE,
    "cobblestone" => Material::COBBLESTONE,
    "dirt" => Material::DIRT,
    "grass_block" => Material::GRASS_BLOCK,
    "sand" => Material::SAND,
    "gravel" => Material::GRAVEL,
    "oak_log" => Material::OAK_LOG,
    "oak_planks" => Material::OAK_PLANKS,
    "glass" => Material::GLASS,
    "bricks" => Material::BRICKS,
    "white_wool" => Material::WHITE_WOOL,
    "glowstone" => Material::GLOWSTONE,
    "water" => Material::WATER,
    "bedrock" => Material::BEDROCK,
    "command_block" => Material::COMMAND_BLOCK,
    "barrier" => Material::BARRIER,
    "end_portal_frame" => Material::END_PORTAL_FRAME,
};

impl Material {
    /// Every material, in id order.
    pub const ALL: [Material; 18] = [
        Material::AIR,
        Material::STONE,
        Material::COBBLESTONE,
        Material::DIRT,
        Material::GRASS_BLOCK,
        Material::SAND,
        Material::GRAVEL,
        Material::OAK_LOG,
        Material::OAK_PLANKS,
        Material::GLASS,
        Material::BRICKS,
        Material::WHITE_WOOL,
        Material::GLOWSTONE,
        Material::WATER,
        Material::BEDROCK,
        Material::COMMAND_BLOCK,
        Material::BARRIER,
        Material::END_PORTAL_FRAME,
    ];

    /// Converts a compact id back into a material.
    ///
    /// # Returns
    /// `None` if `id` does not name a known material.
    pub fn from_id(id: MaterialId) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(id)
    }

    /// The compact id of this material.
    pub fn id(self) -> MaterialId {
        self as MaterialId
    }

    /// Looks a material up by name, ignoring case. Both `"oak_planks"` and
    /// `"OAK_PLANKS"` resolve.
    pub fn from_name(name: &str) -> Option<Self> {
        MATERIAL_NAMES
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    /// The canonical lower-case name, e.g. `"oak_planks"`.
    pub fn name(self) -> &'static str {
        MATERIAL_NAMES
            .entries()
            .find(|(_, material)| **material == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Whether this material represents empty space.
    pub fn is_empty(self) -> bool {
        self == Material::AIR
    }
}

/// Formats the material for humans: `OAK_PLANKS` becomes "oak planks".
impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().replace('_', " "))
    }
}
