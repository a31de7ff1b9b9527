//! Error types for the region editor
//!
//! - **EditError**: every reason an edit, undo or precheck can be refused
//! - **ConfigError**: failures while loading or validating
//!   [`EditConfig`](crate::config::EditConfig)
//!
//! Every `EditError` is raised before any material is debited or any block is
//! written, so a refused request never leaves partial state behind.

use thiserror::Error;

use crate::engine_state::voxels::block::Material;

/// Result type alias for editor operations
pub type Result<T> = std::result::Result<T, EditError>;

/// Result type alias for configuration loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Reasons an edit request is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// Both corners must be set, in the same world.
    #[error("selection is incomplete: set both corners in the same world")]
    SelectionIncomplete,

    /// The request touches more blocks than the actor's rank allows.
    #[error("selection of {requested} blocks exceeds your limit of {limit}")]
    QuotaExceeded { requested: u64, limit: u32 },

    /// A replace selection is larger than the configured scan cap.
    #[error("selection of {volume} blocks is too large to search, the cap is {limit}")]
    SelectionTooLarge { volume: u64, limit: u64 },

    /// The ledger cannot cover the materials the edit needs.
    #[error("not enough {material}: need {required}, have {available}")]
    InsufficientMaterial {
        material: Material,
        required: u64,
        available: u64,
    },

    /// The actor already has a scanning or running operation.
    #[error("an operation is already in progress")]
    OperationInProgress,

    #[error("nothing to undo")]
    NothingToUndo,

    /// The pattern is empty or otherwise unusable.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// The material can never be placed by the editor.
    #[error("{0} is blacklisted")]
    BlacklistedMaterial(Material),

    /// A background region scan died before reporting its result.
    #[error("region scan was aborted")]
    ScanAborted,
}

impl EditError {
    /// Create an invalid pattern error
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Generic IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON or unknown material names
    #[error("parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed but unusable values
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create an invalid configuration error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_material() {
        let err = EditError::InsufficientMaterial {
            material: Material::OAK_PLANKS,
            required: 12,
            available: 3,
        };
        assert_eq!(err.to_string(), "not enough oak planks: need 12, have 3");
        assert_eq!(
            EditError::BlacklistedMaterial(Material::BEDROCK).to_string(),
            "bedrock is blacklisted"
        );
    }

    #[test]
    fn json_errors_convert() {
        let err: ConfigError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
