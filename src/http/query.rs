//! Latest-shuffle query
//!
//! An empty store and an unreachable store are different outcomes: the first
//! yields the identity fallback, the second propagates the error.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::metrics::{self, QueryOutcome};
use crate::models::ShuffleDocument;
use crate::storage::SharedShuffleStore;

/// Read side of the daily shuffle; never mutates the store
#[derive(Clone)]
pub struct ShuffleQueryHandler {
    store: SharedShuffleStore,
}

impl ShuffleQueryHandler {
    pub fn new(store: SharedShuffleStore) -> Self {
        Self { store }
    }

    /// The latest shuffle, or the fallback stamped with the current instant
    pub async fn handle(&self) -> Result<ShuffleDocument> {
        self.handle_at(Utc::now()).await
    }

    /// The latest shuffle, or the fallback stamped with `now`
    pub async fn handle_at(&self, now: DateTime<Utc>) -> Result<ShuffleDocument> {
        match self.store.latest().await {
            Ok(Some(record)) => {
                metrics::record_query(QueryOutcome::Latest);
                tracing::debug!(
                    entry_number = record.entry_number(),
                    document_key = %record.document_key,
                    "Serving latest shuffle"
                );
                Ok(record.into_document())
            }
            Ok(None) => {
                metrics::record_query(QueryOutcome::Fallback);
                tracing::info!("No shuffle published yet, serving fallback");
                ShuffleDocument::fallback(now)
            }
            Err(e) => {
                metrics::record_query(QueryOutcome::Error);
                tracing::error!(error = %e, "Failed to read latest shuffle");
                Err(e)
            }
        }
    }
}
