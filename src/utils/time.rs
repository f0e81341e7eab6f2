//! Clock helpers shared by the publisher and the daily trigger

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Display format for the human-readable `timestamp` field (en-US locale form)
pub const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Build a document key for `instant`.
///
/// Keys are ISO-8601 with millisecond precision and a `Z` suffix, so
/// lexicographic order matches chronological order.
pub fn document_key(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Time zone used for wall-clock scheduling and display timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Coordinated Universal Time
    #[default]
    Utc,
    /// The host's local time zone
    Local,
}

impl Zone {
    /// Calendar date of `instant` in this zone
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Utc => instant.date_naive(),
            Self::Local => instant.with_timezone(&Local).date_naive(),
        }
    }

    /// Resolve a wall-clock datetime in this zone to an instant.
    ///
    /// Ambiguous local times pick the earliest instant; times skipped by a
    /// DST transition move forward one hour.
    pub fn resolve(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        match self {
            Self::Utc => Utc.from_utc_datetime(&naive),
            Self::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .or_else(|| {
                    Local
                        .from_local_datetime(&(naive + Duration::hours(1)))
                        .earliest()
                })
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
        }
    }

    /// Human-readable form of `instant`, e.g. `1/2/2024, 3:04:05 PM`
    pub fn format_display(&self, instant: DateTime<Utc>) -> String {
        match self {
            Self::Utc => instant.format(DISPLAY_FORMAT).to_string(),
            Self::Local => instant
                .with_timezone(&Local)
                .format(DISPLAY_FORMAT)
                .to_string(),
        }
    }

    /// Lowercase identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::Utc => "utc",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Zone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utc" | "z" | "etc/utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            other => Err(Error::config(format!(
                "Unknown time zone '{other}'. Valid options: utc, local"
            ))),
        }
    }
}
