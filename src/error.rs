//! Error types for the ip17mon library
//!
//! Every failure the reader can hit is one variant of [`DatabaseError`].
//! Only [`DatabaseError::InvalidAddress`] is a routine, per-query failure;
//! the corruption variants mean the loaded bytes cannot be trusted.

use thiserror::Error;

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Main error type for database loading and lookups
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The textual address does not parse as IPv4
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    /// Buffer too short or header offsets inconsistent at load time
    #[error("Corrupt database header: {0}")]
    CorruptHeader(String),

    /// A resolved record or index entry is out of bounds or malformed
    #[error("Corrupt database record: {0}")]
    CorruptRecord(String),

    /// I/O error while opening, mapping or decompressing a file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The process-wide database was queried before initialization
    #[error("Database not initialized")]
    Uninitialized,
}

impl DatabaseError {
    /// Whether the engine stays usable after this error.
    ///
    /// Only a bad caller-supplied address is recoverable. Corruption means the
    /// dataset is internally inconsistent and the caller should abort or stop
    /// trusting it.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DatabaseError::InvalidAddress(_))
    }

    /// Whether this error reports corrupt database bytes
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            DatabaseError::CorruptHeader(_) | DatabaseError::CorruptRecord(_)
        )
    }
}
