//! Write-side core of a code-navigation symbol database.
//!
//! An analyzer hands over files, symbols, references, local symbols and
//! diagnostics; the [`writer::Writer`] deduplicates them into a SQLite graph
//! with stable integer ids that a viewer can read back.

pub mod builder;
pub mod config;
pub mod db;
pub mod error;
mod identity;
pub mod name;
mod recorder;
pub mod types;
pub mod writer;

pub use error::{Result, WriterError};
pub use writer::Writer;
