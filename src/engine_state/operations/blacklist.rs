//! Materials the editor never reads as a match and never writes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::block::{BlockState, Material};

/// Materials that are protected from bulk edits.
///
/// Blacklisted blocks are skipped by region scans: they are never a
/// `from` match, never overwritten, never counted toward affected totals,
/// and never consumed or refunded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blacklist {
    materials: BTreeSet<Material>,
}

impl Blacklist {
    /// An empty blacklist.
    pub fn new() -> Self {
        Self::default()
    }

    /// The blocks a server protects out of the box.
    pub fn standard() -> Self {
        [
            Material::BEDROCK,
            Material::END_PORTAL_FRAME,
            Material::COMMAND_BLOCK,
            Material::BARRIER,
        ]
        .into_iter()
        .collect()
    }

    pub fn contains(&self, material: Material) -> bool {
        self.materials.contains(&material)
    }

    /// Whether the block's material is protected.
    pub fn protects(&self, state: &BlockState) -> bool {
        self.contains(state.material)
    }

    pub fn insert(&mut self, material: Material) -> bool {
        self.materials.insert(material)
    }

    pub fn remove(&mut self, material: Material) -> bool {
        self.materials.remove(&material)
    }

    pub fn iter(&self) -> impl Iterator<Item = Material> + '_ {
        self.materials.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl FromIterator<Material> for Blacklist {
    fn from_iter<I: IntoIterator<Item = Material>>(iter: I) -> Self {
        Blacklist {
            materials: iter.into_iter().collect(),
        }
    }
}
