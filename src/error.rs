//! Error type shared by every recording and lifecycle operation.
//!
//! Failures fall in two groups. Recorder failures (a bad range, an unknown id)
//! are local: the caller can drop the offending fact and keep going.
//! Lifecycle and storage failures leave the store in an unknown state and
//! should end the run; [`WriterError::is_fatal`] tells them apart.

use thiserror::Error;

pub type Result<T, E = WriterError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error(
        "invalid source range {start_line}:{start_column}-{end_line}:{end_column}: {reason}"
    )]
    InvalidRange {
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
        reason: &'static str,
    },

    #[error("name hierarchy has no elements")]
    EmptyName,

    #[error("{kind} id must be positive, got {value}")]
    InvalidId { kind: &'static str, value: i64 },

    #[error(
        "database version {found} is not compatible with supported version {supported}"
    )]
    IncompatibleVersion { found: i64, supported: i64 },

    #[error("database is locked by another writer: {path}")]
    Locked { path: String },

    #[error("no database is open")]
    NotOpen,

    #[error("a transaction is already active")]
    TransactionActive,

    #[error("no transaction is active")]
    NoTransaction,

    #[error("unknown symbol id {0}")]
    UnknownSymbol(i64),

    #[error("unknown reference id {0}")]
    UnknownReference(i64),

    #[error("unknown local symbol id {0}")]
    UnknownLocalSymbol(i64),

    #[error("unknown file id {0}")]
    UnknownFile(i64),

    #[error("unknown {kind}: '{value}'")]
    UnknownKind { kind: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl WriterError {
    /// Whether the store can no longer be trusted after this error.
    ///
    /// Storage failures and lifecycle misuse abort the run; everything else
    /// concerns a single fact.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::IncompatibleVersion { .. }
                | Self::Locked { .. }
                | Self::NotOpen
                | Self::TransactionActive
                | Self::NoTransaction
        )
    }
}
