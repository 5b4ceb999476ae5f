//! Error types for inventory_ops

use thiserror::Error;

/// Unified error type for inventory_ops operations
#[derive(Debug, Error)]
pub enum Error {
    /// The feed content is structurally unparsable (bad quoting etc.)
    #[error("Failed to parse feed: {0}")]
    Parse(#[from] csv::Error),
    /// The persistence medium rejected a read or write
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    /// A stored snapshot record could not be decoded
    #[error("Corrupt snapshot record: {0}")]
    Corrupt(String),
    /// Feed file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for inventory_ops operations
pub type Result<T> = std::result::Result<T, Error>;
