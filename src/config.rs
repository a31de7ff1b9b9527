//! # Editor Configuration
//!
//! [`EditConfig`] gathers every tunable the editor reads: execution limits,
//! the blacklist, rank tiers and per-world multipliers. Every field has a
//! default, so a configuration file only needs to name what it changes.
//!
//! ```json
//! {
//!   "execution": { "direct_threshold": 2000, "scan_workers": 1 },
//!   "blacklist": ["BEDROCK", "BARRIER"],
//!   "worlds": [{ "world": 1, "block_limit_multiplier": 0.5 }]
//! }
//! ```

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine_state::operations::blacklist::Blacklist;
use crate::engine_state::ranks::RankTable;
use crate::engine_state::voxels::grid::WorldId;
use crate::error::{ConfigError, ConfigResult};

/// How edits are executed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Edits affecting more positions than this run incrementally across
    /// ticks. Selections larger than this are pre-scanned.
    pub direct_threshold: u64,
    /// Positions processed per incremental batch.
    pub batch_size: usize,
    /// Ticks between two batches of the same job.
    pub batch_interval_ticks: u32,
    /// Progress is reported each time completion crosses a multiple of this.
    pub progress_interval_percent: u8,
    /// Undo records kept per actor.
    pub undo_depth: usize,
    /// Worker threads for region pre-scans. Zero scans on the tick thread.
    pub scan_workers: usize,
    /// Largest selection volume a replace will scan. Replace quotas count
    /// matches, which are only known after the scan, so this bounds the
    /// scan itself.
    pub max_replace_volume: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            direct_threshold: 1000,
            batch_size: 500,
            batch_interval_ticks: 1,
            progress_interval_percent: 10,
            undo_depth: 10,
            scan_workers: 0,
            max_replace_volume: 1 << 24,
        }
    }
}

/// Block limit scaling for one world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldLimit {
    pub world: WorldId,
    pub block_limit_multiplier: f64,
}

/// Complete editor configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    pub execution: ExecutionConfig,
    pub blacklist: Blacklist,
    pub ranks: RankTable,
    pub worlds: Vec<WorldLimit>,
}

impl Default for EditConfig {
    fn default() -> Self {
        EditConfig {
            execution: ExecutionConfig::default(),
            blacklist: Blacklist::standard(),
            ranks: RankTable::default(),
            worlds: Vec::new(),
        }
    }
}

impl EditConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: EditConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config = Self::from_json_str(&fs::read_to_string(path)?)?;
        info!("Loaded editor configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if it exists, falling back to the defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            warn!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let execution = &self.execution;
        if execution.batch_size == 0 {
            return Err(ConfigError::invalid("execution.batch_size must be at least 1"));
        }
        if execution.batch_interval_ticks == 0 {
            return Err(ConfigError::invalid(
                "execution.batch_interval_ticks must be at least 1",
            ));
        }
        if execution.max_replace_volume == 0 {
            return Err(ConfigError::invalid(
                "execution.max_replace_volume must be at least 1",
            ));
        }
        if !(1..=100).contains(&execution.progress_interval_percent) {
            return Err(ConfigError::invalid(
                "execution.progress_interval_percent must be between 1 and 100",
            ));
        }
        if let Some(limit) = self.worlds.iter().find(|limit| {
            let multiplier = limit.block_limit_multiplier;
            !(multiplier.is_finite() && multiplier > 0.0)
        }) {
            return Err(ConfigError::invalid(format!(
                "block_limit_multiplier for {} must be a positive number",
                limit.world
            )));
        }
        if execution.undo_depth == 0 {
            warn!("execution.undo_depth is 0, edits will not be undoable");
        }
        Ok(())
    }
}
