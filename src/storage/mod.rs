//! Shuffle persistence
//!
//! Records live in a single document collection keyed by an ISO-8601
//! document key. The store is append-only from this crate's point of view:
//! nothing here updates or deletes a record.
//!
//! Two backends are provided:
//! - [`SqliteShuffleStore`] - durable, one table per collection
//! - [`MemoryShuffleStore`] - in-process, for tests and ephemeral runs

pub mod repository;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::StoreConfig;
use crate::error::{Error, Result};

pub use repository::{MemoryShuffleStore, SharedShuffleStore, ShuffleStore, SqliteShuffleStore};

/// Which backend holds the shuffle collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(Error::config(format!(
                "Unknown store backend '{other}'. Valid options: sqlite, memory"
            ))),
        }
    }
}

/// Open the configured store as a process-wide shared handle
pub fn create_store(config: &StoreConfig) -> Result<SharedShuffleStore> {
    let store: SharedShuffleStore = match config.backend {
        StoreBackend::Sqlite => Arc::new(SqliteShuffleStore::open(
            &config.sqlite_path,
            &config.collection,
        )?),
        StoreBackend::Memory => Arc::new(MemoryShuffleStore::new()),
    };

    tracing::info!(
        backend = %config.backend,
        collection = %config.collection,
        "Shuffle store ready"
    );
    Ok(store)
}
