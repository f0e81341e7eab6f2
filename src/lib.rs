//! daily-shuffle - Daily shuffle publisher and read endpoint
//!
//! Once per day a scheduled job writes a fresh random permutation of two
//! fixed ranges (`lite`: 0..24, `classic`: 0..52) to a document store. An HTTP
//! endpoint returns the most recent one, or an unshuffled fallback when
//! nothing has been published yet.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`shuffle`] - Fisher-Yates permutation generator
//! - [`storage`] - Append-and-read-latest document store (SQLite, memory)
//! - [`scheduler`] - Scheduled publisher and daily trigger
//! - [`http`] - Read endpoint, health and metrics routes
//! - [`models`] - Persisted and returned data structures
//! - [`config`] - Configuration management and settings
//! - [`metrics`] - Prometheus counters
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use daily_shuffle::http::ShuffleQueryHandler;
//! use daily_shuffle::scheduler::ScheduledPublisher;
//! use daily_shuffle::storage::MemoryShuffleStore;
//! use daily_shuffle::utils::time::Zone;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryShuffleStore::new());
//!     ScheduledPublisher::new(store.clone(), Zone::Utc).publish().await?;
//!     let latest = ShuffleQueryHandler::new(store).handle().await?;
//!     assert_eq!(latest.entry_number, 1);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod shuffle;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::http::{ShuffleQueryHandler, ShuffleServer};
    pub use crate::models::{ShuffleDocument, ShuffleRecord};
    pub use crate::scheduler::{PublishTrigger, ScheduledPublisher, TriggerConfig};
    pub use crate::shuffle::ShuffleGenerator;
    pub use crate::storage::{MemoryShuffleStore, SharedShuffleStore, ShuffleStore, SqliteShuffleStore};
}

// Direct re-exports for convenience
pub use models::{ShuffleDocument, ShuffleRecord};
