//! Common test utilities

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use daily_shuffle::error::{Error, Result};
use daily_shuffle::models::{ShuffleDocument, ShuffleRecord};
use daily_shuffle::storage::ShuffleStore;

/// Create a record with reversed (but valid) sequences
#[allow(dead_code)]
pub fn create_test_record(key: &str, entry_number: u64) -> ShuffleRecord {
    ShuffleRecord::new(
        key,
        ShuffleDocument {
            timestamp: format!("display for {key}"),
            entry_number,
            lite: (0..24).rev().collect(),
            classic: (0..52).rev().collect(),
        },
    )
}

/// Store whose every call fails as if the backend were unreachable
#[allow(dead_code)]
#[derive(Default)]
pub struct UnreachableStore {
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl UnreachableStore {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self, operation: &str) -> Error {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Error::store_unavailable(operation, "connection refused")
    }
}

#[async_trait]
impl ShuffleStore for UnreachableStore {
    async fn count_all(&self) -> Result<u64> {
        Err(self.fail("count_all"))
    }

    async fn latest(&self) -> Result<Option<ShuffleRecord>> {
        Err(self.fail("latest"))
    }

    async fn append(&self, _record: &ShuffleRecord) -> Result<()> {
        Err(self.fail("append"))
    }
}
