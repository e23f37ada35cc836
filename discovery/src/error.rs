//! Error types for generation runs.
//!
//! Provides a unified error type covering every failure mode of a run:
//! discovery, merging, casing, the external generator, output writes, and
//! configuration parsing.

use thiserror::Error;

use crate::discover::DiscoverError;
use crate::generator::GeneratorError;

/// Errors that can abort a generation run.
#[derive(Debug, Error)]
pub enum TypegenError {
    /// Schema files could not be found or parsed.
    #[error(transparent)]
    Discover(#[from] DiscoverError),

    /// Schema documents could not be merged.
    #[error("merge failed: {0}")]
    Merge(#[from] model_typegen_core::MergeError),

    /// Property renaming collapsed two names into one.
    #[error("casing failed: {0}")]
    Case(#[from] model_typegen_core::CaseError),

    /// The external generator is missing or failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// File I/O failure (output or configuration).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required setting is missing or invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results with [`TypegenError`].
pub type Result<T> = std::result::Result<T, TypegenError>;
