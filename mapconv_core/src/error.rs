//! Error types for the conversion pipeline.
//!
//! Only the fatal kinds from the taxonomy live here as `Err` variants.
//! Recoverable events (mapping misses, restriction misses, bounds
//! clamps) are represented as [`crate::report::Note`]s instead, since
//! they never abort a run.

use thiserror::Error;

/// Custom `Result` type, to always return our custom error.
pub type Result<T, E = ConvertError> = core::result::Result<T, E>;

/// Errors that can abort a single map's conversion.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Map directory not found: {0}.")]
    MapDirectoryNotFound(String),

    #[error("Asset catalog not found: {0}.")]
    CatalogNotFound(String),

    #[error("Base terrain mesh data not found for terrain '{0}'.")]
    TerrainMeshNotFound(String),

    #[error("Parse error in {file}, line {line}: {reason}.")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Terrain error for '{terrain}': {reason}.")]
    TerrainError { terrain: String, reason: String },

    #[error("Scene emission invariant violated: {0}.")]
    EmitError(String),

    #[error("Validation failed with {0} violation(s).")]
    ValidationFailure(usize),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Represents all other cases of `serde_json::Error`.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

impl ConvertError {
    /// Maps a kind of error to the process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MapDirectoryNotFound(_) | Self::CatalogNotFound(_) | Self::TerrainMeshNotFound(_) => 2,
            Self::ValidationFailure(_) => 3,
            _ => 1,
        }
    }
}
