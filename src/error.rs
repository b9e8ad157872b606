//! Unified error hierarchy for flagplan
//!
//! Local validation and duplicate conditions never touch the store;
//! store failures are converted to a uniform `Storage` variant at the
//! persistence-adapter boundary so raw transport errors never reach
//! callers. "Not found" is modeled as `Option`, not as an error.

use thiserror::Error;

use crate::export::ExportError;
use crate::store::StoreError;

/// Top-level error type for all flagplan operations
#[derive(Debug, Error)]
pub enum FlagPlanError {
    /// Local validation failure (e.g. empty plan name), no external call made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Drill already present in the composition list
    #[error("Drill already in training: {drill_id}")]
    DuplicateDrill { drill_id: String },

    /// Uniform storage failure from the document store
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Catalog loading/parsing errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for flagplan operations
pub type Result<T> = std::result::Result<T, FlagPlanError>;
