//! Pipeline error types
//!
//! Per-record transform failures are separated from the errors that abort a
//! whole dataset.

use thiserror::Error;

use crate::config::ConfigError;
use crate::dataset::extract::ExtractError;
use crate::db::DbError;

/// Failure to turn one raw FDC record into an ingredient
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid publication date '{0}', expected MM/DD/YYYY")]
    InvalidDate(String),

    #[error("food class '{0}' is not supported")]
    NotImplemented(&'static str),
}

impl TransformError {
    /// Whether the offending record can be skipped while the pass continues
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransformError::MissingField(_) | TransformError::InvalidDate(_)
        )
    }
}

/// Result type for record transformation
pub type TransformResult<T> = Result<T, TransformError>;

/// Errors that abort processing of a dataset (or the whole run)
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("transform failed at line {line}: {source}")]
    Transform {
        line: usize,
        #[source]
        source: TransformError,
    },

    #[error("malformed record stream at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("interrupted by user")]
    Interrupted,
}

impl PipelineError {
    /// Whether this error came from a user interrupt rather than a failure
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            PipelineError::Interrupted | PipelineError::Extract(ExtractError::Interrupted)
        )
    }
}

impl From<rusqlite::Error> for PipelineError {
    fn from(e: rusqlite::Error) -> Self {
        PipelineError::Database(DbError::Sqlite(e))
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
