//! Scheduled shuffle publisher
//!
//! One invocation writes at most one record: read the current count, derive
//! the entry number, generate both decks, append. The append is the only
//! mutating call, so a failure at any step leaves the store unchanged.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::metrics;
use crate::models::{ShuffleDocument, ShuffleRecord};
use crate::shuffle::{ShuffleGenerator, CLASSIC_SIZE, LITE_SIZE};
use crate::storage::SharedShuffleStore;
use crate::utils::time::{document_key, Zone};

/// Writes one new shuffle per invocation
#[derive(Clone)]
pub struct ScheduledPublisher {
    store: SharedShuffleStore,
    zone: Zone,
}

impl ScheduledPublisher {
    /// `zone` controls the human-readable `timestamp`; keys are always UTC
    pub fn new(store: SharedShuffleStore, zone: Zone) -> Self {
        Self { store, zone }
    }

    /// Publish a shuffle stamped with the current instant
    pub async fn publish(&self) -> Result<ShuffleRecord> {
        self.publish_at(Utc::now()).await
    }

    /// Publish a shuffle stamped with `instant`
    pub async fn publish_at(&self, instant: DateTime<Utc>) -> Result<ShuffleRecord> {
        match self.try_publish(instant).await {
            Ok(record) => {
                metrics::record_publish();
                tracing::info!(
                    entry_number = record.entry_number(),
                    document_key = %record.document_key,
                    "Published daily shuffle"
                );
                Ok(record)
            }
            Err(e) => {
                metrics::record_publish_failure();
                tracing::error!(
                    error = %e,
                    category = e.category().as_str(),
                    "Failed to publish daily shuffle"
                );
                Err(e)
            }
        }
    }

    async fn try_publish(&self, instant: DateTime<Utc>) -> Result<ShuffleRecord> {
        let existing = self.store.count_all().await?;
        let entry_number = existing + 1;

        // ThreadRng is !Send; keep it out of scope across the await below
        let (lite, classic) = {
            let mut generator = ShuffleGenerator::new();
            (
                generator.generate(LITE_SIZE)?,
                generator.generate(CLASSIC_SIZE)?,
            )
        };

        let record = ShuffleRecord::new(
            document_key(instant),
            ShuffleDocument {
                timestamp: self.zone.format_display(instant),
                entry_number,
                lite,
                classic,
            },
        );

        self.store.append(&record).await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::shuffle::is_permutation;
    use crate::storage::{MemoryShuffleStore, ShuffleStore};
    use chrono::Duration;
    use std::sync::Arc;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_first_publish_is_entry_one() {
        let store = Arc::new(MemoryShuffleStore::new());
        let publisher = ScheduledPublisher::new(store.clone(), Zone::Utc);

        let record = publisher.publish().await.unwrap();

        assert_eq!(record.entry_number(), 1);
        assert_eq!(store.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_entry_number_follows_count() {
        let store = Arc::new(MemoryShuffleStore::new());
        let publisher = ScheduledPublisher::new(store.clone(), Zone::Utc);
        let start = instant("2024-01-01T00:00:00Z");

        for day in 0..3 {
            let record = publisher
                .publish_at(start + Duration::days(day))
                .await
                .unwrap();
            assert_eq!(record.entry_number(), day as u64 + 1);
        }
    }

    #[tokio::test]
    async fn test_record_fields() {
        let store = Arc::new(MemoryShuffleStore::new());
        let publisher = ScheduledPublisher::new(store.clone(), Zone::Utc);

        let record = publisher
            .publish_at(instant("2024-01-02T15:04:05.250Z"))
            .await
            .unwrap();

        assert_eq!(record.document_key, "2024-01-02T15:04:05.250Z");
        assert_eq!(record.document.timestamp, "1/2/2024, 3:04:05 PM");
        assert!(is_permutation(&record.document.lite, LITE_SIZE));
        assert!(is_permutation(&record.document.classic, CLASSIC_SIZE));

        let stored = store.latest().await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_same_instant_fails_without_overwrite() {
        let store = Arc::new(MemoryShuffleStore::new());
        let publisher = ScheduledPublisher::new(store.clone(), Zone::Utc);
        let at = instant("2024-01-01T00:00:00Z");

        let first = publisher.publish_at(at).await.unwrap();
        let err = publisher.publish_at(at).await.unwrap_err();

        assert!(matches!(err, Error::DocumentExists { .. }));
        assert_eq!(store.count_all().await.unwrap(), 1);
        assert_eq!(store.latest().await.unwrap(), Some(first));
    }
}
