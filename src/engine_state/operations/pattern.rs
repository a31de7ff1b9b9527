//! # Block Patterns
//!
//! A pattern is a weighted list of materials used to fill a region with mixed
//! content, e.g. 70% stone and 30% dirt.
//!
//! Draws use a uniform value in `[0, total_weight)` and walk the entries,
//! picking the first whose cumulative weight exceeds the draw. Requirement
//! estimation rounds every entry up, so the estimates for a multi-entry
//! pattern may add up to more than the volume; the editor reserves the
//! estimates and refunds whatever is left over.

use std::collections::BTreeMap;

use fastrand::Rng;
use log::debug;

use crate::engine_state::voxels::block::Material;
use crate::error::{EditError, Result};

/// One material of a pattern and its relative weight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PatternEntry {
    pub material: Material,
    pub weight: u32,
}

/// An ordered, weighted multiset of materials.
///
/// # Examples
///
/// ```
/// use voxel_edit::{BlockPattern, Material};
///
/// let pattern = BlockPattern::parse_lenient("stone:70, dirt:30");
/// let estimate = pattern.estimate_requirements(100);
/// assert_eq!(estimate[&Material::STONE], 70);
/// assert_eq!(estimate[&Material::DIRT], 30);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockPattern {
    entries: Vec<PatternEntry>,
    total_weight: u64,
}

impl BlockPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pattern that always draws `material`.
    pub fn single(material: Material) -> Self {
        let mut pattern = Self::new();
        pattern.add(material, 1);
        pattern
    }

    /// Adds `weight` to `material`'s entry, creating the entry if needed.
    ///
    /// # Returns
    /// `false` (and leaves the pattern unchanged) if `weight` is zero.
    pub fn add(&mut self, material: Material, weight: u32) -> bool {
        if weight == 0 {
            return false;
        }
        match self.entries.iter_mut().find(|entry| entry.material == material) {
            Some(entry) => entry.weight = entry.weight.saturating_add(weight),
            None => self.entries.push(PatternEntry { material, weight }),
        }
        self.total_weight = self.entries.iter().map(|entry| u64::from(entry.weight)).sum();
        true
    }

    /// Parses `name[:weight]` entries separated by commas.
    ///
    /// Malformed entries (unknown material, non-numeric or zero weight) are
    /// skipped rather than failing the whole pattern. A bare material name
    /// has weight 1. The result may be empty; call [`BlockPattern::validate`]
    /// before using it.
    pub fn parse_lenient(input: &str) -> Self {
        let mut pattern = Self::new();
        for raw in input.split(',').map(str::trim).filter(|raw| !raw.is_empty()) {
            let (name, weight) = match raw.split_once(':') {
                Some((name, weight)) => (name, weight.trim().parse::<u32>().ok()),
                None => (raw, Some(1)),
            };
            match (Material::from_name(name), weight) {
                (Some(material), Some(weight)) if pattern.add(material, weight) => {}
                _ => debug!("Skipping malformed pattern entry '{raw}'"),
            }
        }
        pattern
    }

    pub fn entries(&self) -> &[PatternEntry] {
        &self.entries
    }

    pub fn materials(&self) -> impl Iterator<Item = Material> + '_ {
        self.entries.iter().map(|entry| entry.material)
    }

    /// The weight of `material`, or 0 if it is not part of the pattern.
    pub fn weight_of(&self, material: Material) -> u32 {
        self.entries
            .iter()
            .find(|entry| entry.material == material)
            .map_or(0, |entry| entry.weight)
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rejects patterns that cannot produce a material.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() || self.total_weight == 0 {
            return Err(EditError::invalid_pattern("pattern has no materials"));
        }
        Ok(())
    }

    /// Draws a material with probability `weight / total_weight`.
    ///
    /// # Returns
    /// `None` only for an empty pattern.
    pub fn sample(&self, rng: &mut Rng) -> Option<Material> {
        match self.entries.as_slice() {
            [] => None,
            [only] => Some(only.material),
            entries => Self::pick(entries.iter(), self.total_weight, rng),
        }
    }

    /// Draws like [`BlockPattern::sample`], restricted to the materials for
    /// which `allowed` returns true. Weights keep their relative proportions.
    pub fn sample_within(
        &self,
        rng: &mut Rng,
        allowed: impl Fn(Material) -> bool,
    ) -> Option<Material> {
        let allowed_entries = || self.entries.iter().filter(|entry| allowed(entry.material));
        let total: u64 = allowed_entries().map(|entry| u64::from(entry.weight)).sum();
        if total == 0 {
            return None;
        }
        Self::pick(allowed_entries(), total, rng)
    }

    fn pick<'a>(
        entries: impl Iterator<Item = &'a PatternEntry>,
        total: u64,
        rng: &mut Rng,
    ) -> Option<Material> {
        let value = rng.u64(0..total);
        let mut cumulative = 0u64;
        let mut last = None;
        for entry in entries {
            cumulative += u64::from(entry.weight);
            if value < cumulative {
                return Some(entry.material);
            }
            last = Some(entry.material);
        }
        last
    }

    /// The number of blocks of each material needed to fill `volume`
    /// positions: `ceil(weight * volume / total_weight)` per entry.
    pub fn estimate_requirements(&self, volume: u64) -> BTreeMap<Material, u64> {
        let total = u128::from(self.total_weight);
        if total == 0 {
            return BTreeMap::new();
        }
        self.entries
            .iter()
            .map(|entry| {
                let scaled = u128::from(entry.weight) * u128::from(volume);
                let amount = scaled.div_ceil(total);
                (entry.material, u64::try_from(amount).unwrap_or(u64::MAX))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone_dirt() -> BlockPattern {
        let mut pattern = BlockPattern::new();
        pattern.add(Material::STONE, 70);
        pattern.add(Material::DIRT, 30);
        pattern
    }

    #[test]
    fn seventy_thirty_estimates_exactly() {
        let estimate = stone_dirt().estimate_requirements(100);
        assert_eq!(estimate.get(&Material::STONE), Some(&70));
        assert_eq!(estimate.get(&Material::DIRT), Some(&30));
    }

    #[test]
    fn estimates_cover_the_volume() {
        let mut rng = Rng::with_seed(11);
        for _ in 0..200 {
            let mut pattern = BlockPattern::new();
            let entries = rng.usize(1..=5);
            for material in &Material::ALL[1..=entries] {
                pattern.add(*material, rng.u32(1..=100));
            }
            let volume = rng.u64(0..10_000);
            let sum: u64 = pattern.estimate_requirements(volume).values().sum();
            if pattern.len() == 1 {
                assert_eq!(sum, volume);
            } else {
                assert!(sum >= volume, "{sum} < {volume} for {pattern:?}");
            }
        }
    }

    #[test]
    fn three_equal_entries_over_reserve() {
        let mut pattern = BlockPattern::new();
        pattern.add(Material::STONE, 1);
        pattern.add(Material::DIRT, 1);
        pattern.add(Material::SAND, 1);
        let sum: u64 = pattern.estimate_requirements(10).values().sum();
        assert_eq!(sum, 12);
    }

    #[test]
    fn duplicate_materials_merge() {
        let mut pattern = BlockPattern::new();
        pattern.add(Material::STONE, 2);
        pattern.add(Material::STONE, 3);
        assert_eq!(pattern.len(), 1);
        assert_eq!(pattern.weight_of(Material::STONE), 5);
        assert_eq!(pattern.total_weight(), 5);
    }

    #[test]
    fn zero_weight_is_skipped() {
        let mut pattern = BlockPattern::new();
        assert!(!pattern.add(Material::STONE, 0));
        assert!(matches!(pattern.validate(), Err(EditError::InvalidPattern(_))));
    }

    #[test]
    fn single_entry_short_circuits() {
        let mut rng = Rng::with_seed(1);
        let pattern = BlockPattern::single(Material::GLASS);
        assert!((0..50).all(|_| pattern.sample(&mut rng) == Some(Material::GLASS)));
        assert_eq!(BlockPattern::new().sample(&mut rng), None);
    }

    #[test]
    fn sampling_follows_the_weights() {
        let mut rng = Rng::with_seed(42);
        let pattern = stone_dirt();
        let stone = (0..10_000)
            .filter(|_| pattern.sample(&mut rng) == Some(Material::STONE))
            .count();
        assert!((6_600..=7_400).contains(&stone), "stone drawn {stone} times");
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let pattern = stone_dirt();
        let draw = |seed| {
            let mut rng = Rng::with_seed(seed);
            (0..32).map(|_| pattern.sample(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(9), draw(9));
    }

    #[test]
    fn restricted_sampling_only_returns_allowed_materials() {
        let mut rng = Rng::with_seed(3);
        let pattern = stone_dirt();
        let only_dirt = |m: Material| m == Material::DIRT;
        assert!((0..100)
            .all(|_| pattern.sample_within(&mut rng, only_dirt) == Some(Material::DIRT)));
        assert_eq!(pattern.sample_within(&mut rng, |_| false), None);
    }

    #[test]
    fn lenient_parser_skips_bad_entries() {
        let pattern = BlockPattern::parse_lenient("stone:70,dirt:abc, unobtainium:5,glass:0,sand");
        assert_eq!(pattern.len(), 2);
        assert_eq!(pattern.weight_of(Material::STONE), 70);
        assert_eq!(pattern.weight_of(Material::SAND), 1);
        assert!(BlockPattern::parse_lenient(" , ,").validate().is_err());
    }
}
