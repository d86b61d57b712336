//! Error types for the action engine.

use std::path::PathBuf;

use thiserror::Error;

/// Recoverable failures surfaced by engine operations.
///
/// None of these abort the host: config and recipe problems skip the offending
/// entry, crafting and permission failures are reported back to the actor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PowerError {
    /// A registry or recipe entry in the persisted configuration is malformed.
    #[error("invalid config entry `{key}`: {reason}")]
    ConfigInvalid { key: String, reason: String },

    /// A recipe has the wrong shape or references an undefined ingredient.
    #[error("invalid recipe `{tool}`: {reason}")]
    RecipeInvalid { tool: String, reason: String },

    /// A crafting grid agrees with a recipe but a slot is short.
    #[error("missing ingredient for `{tool}` in slot {slot}: need {required} {item}, have {available}")]
    MissingIngredient {
        tool: String,
        slot: usize,
        item: String,
        required: u32,
        available: u32,
    },

    /// A tool name does not resolve to any catalog entry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The actor lacks the permission for the requested action.
    #[error("permission denied: {permission}")]
    PermissionDenied { permission: String },

    /// Region selection yielded no coordinates.
    #[error("region is empty")]
    RegionEmpty,
}

/// Result type for engine operations.
pub type PowerResult<T> = Result<T, PowerError>;

/// Unrecoverable setup failures. These abort startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {path} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
