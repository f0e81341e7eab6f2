// Core data structures for the daily shuffle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::shuffle::{identity, CLASSIC_SIZE, LITE_SIZE};
use crate::utils::time::document_key;

/// Body of a persisted shuffle, and the exact JSON returned to readers.
///
/// Serialized as `{timestamp, entryNumber, lite, classic}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShuffleDocument {
    /// Human-readable creation time, display only
    pub timestamp: String,
    /// 1-based advisory sequence number
    pub entry_number: u64,
    /// Permutation of `0..24`
    pub lite: Vec<u32>,
    /// Permutation of `0..52`
    pub classic: Vec<u32>,
}

impl ShuffleDocument {
    /// The record served when nothing has been published yet.
    ///
    /// Both sequences are in natural order so callers can tell "no data yet"
    /// apart from a real shuffle.
    pub fn fallback(now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            timestamp: document_key(now),
            entry_number: 1,
            lite: identity(LITE_SIZE)?,
            classic: identity(CLASSIC_SIZE)?,
        })
    }
}

/// A shuffle together with the key it is stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleRecord {
    /// ISO-8601 primary key; orders records chronologically
    pub document_key: String,
    pub document: ShuffleDocument,
}

impl ShuffleRecord {
    pub fn new(document_key: impl Into<String>, document: ShuffleDocument) -> Self {
        Self {
            document_key: document_key.into(),
            document,
        }
    }

    pub fn entry_number(&self) -> u64 {
        self.document.entry_number
    }

    /// Drop the key, keeping only what readers see
    pub fn into_document(self) -> ShuffleDocument {
        self.document
    }
}
