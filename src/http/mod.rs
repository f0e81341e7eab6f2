//! HTTP read endpoint for the daily shuffle
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           Shuffle Server            │
//! │                                     │
//! │  ┌──────────────────────────────┐   │
//! │  │        REST API              │   │
//! │  │  GET  /                      │   │
//! │  │  GET  /api/shuffle           │   │
//! │  │  GET  /api/health            │   │
//! │  │  GET  /metrics               │   │
//! │  └──────────────────────────────┘   │
//! │                                     │
//! │  ┌──────────────────────────────┐   │
//! │  │     Publish Trigger          │   │
//! │  │  - daily at publish_time     │   │
//! │  └──────────────────────────────┘   │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use daily_shuffle::config::Config;
//! use daily_shuffle::http::ShuffleServer;
//! use daily_shuffle::storage::create_store;
//!
//! let config = Config::default();
//! let store = create_store(&config.store)?;
//! let server = ShuffleServer::new(config, store)?;
//! server.start_with_shutdown(shutdown_signal()).await?;
//! ```

pub mod api;
pub mod query;
pub mod server;

// Re-export main types
pub use api::create_router;
pub use query::ShuffleQueryHandler;
pub use server::{AppState, ServerError, ServerInfo, ShuffleServer};
