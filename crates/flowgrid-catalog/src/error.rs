//! Error types for the process catalog.

use thiserror::Error;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during catalog operations.
///
/// Absence is never an error; lookups return `Ok(None)` instead. Every
/// variant here is fatal to the apply loop, which owns recovery.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("malformed index key: {0}")]
    Key(String),

    /// The caller handed over a record that violates the write contract.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("failed to parse resource '{resource}': {reason}")]
    Parse { resource: String, reason: String },
}
