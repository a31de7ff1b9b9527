//! # Material Ledger
//!
//! Every block the editor places is paid for from the actor's virtual
//! inventory, and every block it removes is credited back. The editor talks
//! to the inventory through [`MaterialLedger`] so hosts can plug in their own
//! storage; [`VirtualInventory`] is the in-memory implementation, with a JSON
//! snapshot for persistence.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::engine_state::voxels::block::Material;
use crate::engine_state::ActorId;
use crate::error::ConfigResult;

/// Counted per-actor material balances.
///
/// All calls come from the tick thread, so a `has` check followed by a
/// `debit` cannot be interleaved with another debit.
pub trait MaterialLedger {
    /// How many units of `material` the actor holds.
    fn balance(&self, actor: ActorId, material: Material) -> u64;

    fn has(&self, actor: ActorId, material: Material, amount: u64) -> bool {
        self.balance(actor, material) >= amount
    }

    /// Removes `amount` units.
    ///
    /// # Returns
    /// `false`, leaving the balance untouched, if the actor holds fewer than
    /// `amount` units.
    fn debit(&mut self, actor: ActorId, material: Material, amount: u64) -> bool;

    fn credit(&mut self, actor: ActorId, material: Material, amount: u64);
}

/// In-memory material balances for any number of actors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualInventory {
    balances: HashMap<ActorId, BTreeMap<Material, u64>>,
}

/// Serialized form of a [`VirtualInventory`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub actors: Vec<ActorInventory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActorInventory {
    pub actor: ActorId,
    pub materials: BTreeMap<Material, u64>,
}

impl VirtualInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every non-zero balance the actor holds.
    pub fn contents(&self, actor: ActorId) -> BTreeMap<Material, u64> {
        self.balances.get(&actor).cloned().unwrap_or_default()
    }

    /// Total units across all materials.
    pub fn total(&self, actor: ActorId) -> u64 {
        self.balances
            .get(&actor)
            .map_or(0, |materials| materials.values().sum())
    }

    /// Drops all of an actor's balances.
    pub fn clear(&mut self, actor: ActorId) {
        self.balances.remove(&actor);
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        let mut actors: Vec<_> = self
            .balances
            .iter()
            .filter(|(_, materials)| !materials.is_empty())
            .map(|(actor, materials)| ActorInventory {
                actor: *actor,
                materials: materials.clone(),
            })
            .collect();
        actors.sort_by_key(|entry| entry.actor);
        InventorySnapshot { actors }
    }

    pub fn from_snapshot(snapshot: InventorySnapshot) -> Self {
        let mut inventory = Self::new();
        for entry in snapshot.actors {
            for (material, amount) in entry.materials {
                inventory.credit(entry.actor, material, amount);
            }
        }
        inventory
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json).map(Self::from_snapshot)
    }

    /// Writes the snapshot to `path` as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        info!("Saved virtual inventory to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json(&json)?)
    }
}

impl MaterialLedger for VirtualInventory {
    fn balance(&self, actor: ActorId, material: Material) -> u64 {
        self.balances
            .get(&actor)
            .and_then(|materials| materials.get(&material))
            .copied()
            .unwrap_or(0)
    }

    fn debit(&mut self, actor: ActorId, material: Material, amount: u64) -> bool {
        if amount == 0 {
            return true;
        }
        let Some(materials) = self.balances.get_mut(&actor) else {
            return false;
        };
        match materials.get_mut(&material) {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                if *balance == 0 {
                    materials.remove(&material);
                }
                true
            }
            _ => false,
        }
    }

    fn credit(&mut self, actor: ActorId, material: Material, amount: u64) {
        if amount == 0 || material.is_empty() {
            return;
        }
        let balance = self
            .balances
            .entry(actor)
            .or_default()
            .entry(material)
            .or_default();
        *balance = balance.saturating_add(amount);
    }
}
