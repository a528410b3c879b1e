// Writer configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WriterError};

/// Upper bound for `busy_timeout_ms`; a writer waiting longer than this for
/// a lock is almost certainly racing a stuck process.
pub const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

/// How local symbols (parameters, local variables) are keyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalSymbolIdentity {
    /// Key by bare name. Two locals called `i` in different functions share
    /// one id and one location set.
    #[default]
    ByName,
    /// Key by `(scope symbol, name)` when a scope is supplied.
    ByScope,
}

impl LocalSymbolIdentity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByName => "by_name",
            Self::ByScope => "by_scope",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    pub local_symbols: LocalSymbolIdentity,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

/// Options for [`crate::writer::Writer::session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Truncate all tables right after opening.
    pub clear_on_open: bool,
    /// Run the whole session inside one transaction.
    pub wrap_in_transaction: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// How long `open` waits for another connection's lock, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clear_on_open: false,
            wrap_in_transaction: true,
        }
    }
}

impl WriterConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| WriterError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: WriterConfig =
            toml::from_str(content).map_err(|e| WriterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(WriterError::Config(format!(
                "busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}, got {}",
                self.storage.busy_timeout_ms
            )));
        }
        Ok(())
    }

    /// Session options preset: clear the store, then record in one transaction.
    pub fn clearing(mut self) -> Self {
        self.session.clear_on_open = true;
        self
    }
}
