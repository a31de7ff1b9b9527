//! # Ranks and Quotas
//!
//! An actor's quota is the largest number of blocks a single edit may touch.
//! It comes from the actor's rank: tiers are checked from highest to lowest
//! and the first tier whose permission node the actor holds wins. Actors
//! that hold none get the default tier. Each world may scale the limit with a
//! multiplier, rounded up.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::EditConfig;
use crate::engine_state::voxels::grid::WorldId;
use crate::engine_state::ActorId;

/// Prefix of every rank permission node.
pub const RANK_PERMISSION_PREFIX: &str = "voxeledit.rank.";

/// Resolves how many blocks one edit by `actor` in `world` may touch.
pub trait QuotaResolver {
    fn quota_for(&self, actor: ActorId, world: WorldId) -> u32;
}

/// Answers permission checks for actors.
pub trait PermissionSource {
    fn has_permission(&self, actor: ActorId, node: &str) -> bool;
}

/// One rank: its name, the permission that grants it, and its block limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTier {
    pub name: String,
    pub permission: String,
    pub block_limit: u32,
}

impl RankTier {
    /// A tier granted by `voxeledit.rank.<lowercase name>`.
    pub fn new(name: impl Into<String>, block_limit: u32) -> Self {
        let name = name.into();
        RankTier {
            permission: format!("{RANK_PERMISSION_PREFIX}{}", name.to_lowercase()),
            name,
            block_limit,
        }
    }
}

/// Ordered rank tiers, highest first, plus the fallback tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankTable {
    pub tiers: Vec<RankTier>,
    pub default: RankTier,
}

impl Default for RankTable {
    fn default() -> Self {
        RankTable {
            tiers: vec![
                RankTier::new("Sovereign", 400),
                RankTier::new("Nebula", 350),
                RankTier::new("Skyforge", 300),
                RankTier::new("Skymason", 200),
            ],
            default: RankTier::new("Aetherian", 100),
        }
    }
}

impl RankTable {
    /// The first tier, in list order, whose permission the actor holds.
    pub fn rank_of<P: PermissionSource + ?Sized>(
        &self,
        permissions: &P,
        actor: ActorId,
    ) -> &RankTier {
        self.tiers
            .iter()
            .find(|tier| permissions.has_permission(actor, &tier.permission))
            .unwrap_or(&self.default)
    }

    pub fn tier(&self, name: &str) -> Option<&RankTier> {
        self.tiers
            .iter()
            .chain(std::iter::once(&self.default))
            .find(|tier| tier.name.eq_ignore_ascii_case(name))
    }
}

/// In-memory permission grants.
#[derive(Clone, Debug, Default)]
pub struct PermissionSet {
    grants: HashMap<ActorId, HashSet<String>>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, actor: ActorId, node: impl Into<String>) {
        self.grants.entry(actor).or_default().insert(node.into());
    }

    pub fn revoke(&mut self, actor: ActorId, node: &str) -> bool {
        self.grants
            .get_mut(&actor)
            .is_some_and(|nodes| nodes.remove(node))
    }
}

impl PermissionSource for PermissionSet {
    fn has_permission(&self, actor: ActorId, node: &str) -> bool {
        self.grants
            .get(&actor)
            .is_some_and(|nodes| nodes.contains(node))
    }
}

/// Rank-based quotas with per-world multipliers.
pub struct RankQuota<P> {
    table: RankTable,
    multipliers: HashMap<WorldId, f64>,
    permissions: P,
}

impl<P: PermissionSource> RankQuota<P> {
    pub fn new(table: RankTable, permissions: P) -> Self {
        RankQuota {
            table,
            multipliers: HashMap::new(),
            permissions,
        }
    }

    /// Takes the rank table and world multipliers from a configuration.
    pub fn from_config(config: &EditConfig, permissions: P) -> Self {
        let mut quota = Self::new(config.ranks.clone(), permissions);
        for world in &config.worlds {
            quota.set_world_multiplier(world.world, world.block_limit_multiplier);
        }
        quota
    }

    pub fn with_world_multiplier(mut self, world: WorldId, multiplier: f64) -> Self {
        self.set_world_multiplier(world, multiplier);
        self
    }

    pub fn set_world_multiplier(&mut self, world: WorldId, multiplier: f64) {
        self.multipliers.insert(world, multiplier);
    }

    /// The multiplier for `world`, 1.0 unless configured.
    pub fn world_multiplier(&self, world: WorldId) -> f64 {
        self.multipliers.get(&world).copied().unwrap_or(1.0)
    }

    pub fn rank_of(&self, actor: ActorId) -> &RankTier {
        self.table.rank_of(&self.permissions, actor)
    }

    pub fn table(&self) -> &RankTable {
        &self.table
    }

    pub fn permissions(&self) -> &P {
        &self.permissions
    }

    pub fn permissions_mut(&mut self) -> &mut P {
        &mut self.permissions
    }
}

impl<P: PermissionSource> QuotaResolver for RankQuota<P> {
    fn quota_for(&self, actor: ActorId, world: WorldId) -> u32 {
        let base = f64::from(self.rank_of(actor).block_limit);
        let scaled = (base * self.world_multiplier(world)).ceil();
        // float to int casts saturate
        scaled as u32
    }
}

/// The same quota for everyone, everywhere.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixedQuota(pub u32);

impl QuotaResolver for FixedQuota {
    fn quota_for(&self, _actor: ActorId, _world: WorldId) -> u32 {
        self.0
    }
}
