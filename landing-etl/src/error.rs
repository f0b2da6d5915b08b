//! Error types for landing-etl
//!
//! The cleaning pipeline itself never fails; these errors only surface at
//! the edges (fetching, decoding input batches, writing output).

use thiserror::Error;

use crate::services::ClientError;

/// ETL error type
#[derive(Debug, Error)]
pub enum EtlError {
    /// Upstream API failure
    #[error("API client error: {0}")]
    Client(#[from] ClientError),

    /// Input batch is not a usable list of launch records
    #[error("Invalid launch batch: {0}")]
    InvalidBatch(String),

    /// Invalid parameter (split sizes, label lengths, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// landing-common error
    #[error("Common error: {0}")]
    Common(#[from] landing_common::Error),
}

/// Convenience Result type using EtlError
pub type EtlResult<T> = std::result::Result<T, EtlError>;
