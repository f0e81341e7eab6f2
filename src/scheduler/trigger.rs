//! Daily publish trigger
//!
//! Wakes once per day at a configured wall-clock time and runs the
//! [`ScheduledPublisher`]. A failed publish is logged and the loop moves on
//! to the next period; there is no retry inside a period.

use chrono::{DateTime, Days, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use super::publisher::ScheduledPublisher;
use crate::error::{Error, Result};
use crate::utils::time::Zone;

// ============================================================================
// Trigger Configuration
// ============================================================================

/// Configuration for the publish trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Run the in-process trigger at all
    pub enabled: bool,

    /// Time to publish each day (24h format, e.g. "00:00")
    pub publish_time: String,

    /// Zone `publish_time` is interpreted in, also used for display timestamps
    pub timezone: Zone,

    /// Publish once immediately when the trigger starts
    pub publish_on_startup: bool,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            publish_time: "00:00".to_string(),
            timezone: Zone::Utc,
            publish_on_startup: false,
        }
    }
}

impl TriggerConfig {
    /// Create a new config builder
    pub fn builder() -> TriggerConfigBuilder {
        TriggerConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.parse_publish_time().map(|_| ())
    }

    /// Parse the publish time
    pub fn parse_publish_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.publish_time, "%H:%M").map_err(|_| {
            Error::config(format!(
                "Invalid publish_time '{}'. Expected HH:MM",
                self.publish_time
            ))
        })
    }
}

/// Builder for TriggerConfig
#[derive(Debug, Default)]
pub struct TriggerConfigBuilder {
    enabled: Option<bool>,
    publish_time: Option<String>,
    timezone: Option<Zone>,
    publish_on_startup: Option<bool>,
}

impl TriggerConfigBuilder {
    /// Enable or disable the trigger
    pub fn enabled(mut self, value: bool) -> Self {
        self.enabled = Some(value);
        self
    }

    /// Set publish time
    pub fn publish_time(mut self, time: impl Into<String>) -> Self {
        self.publish_time = Some(time.into());
        self
    }

    /// Set timezone
    pub fn timezone(mut self, zone: Zone) -> Self {
        self.timezone = Some(zone);
        self
    }

    /// Set publish on startup
    pub fn publish_on_startup(mut self, value: bool) -> Self {
        self.publish_on_startup = Some(value);
        self
    }

    /// Build the config
    pub fn build(self) -> Result<TriggerConfig> {
        let defaults = TriggerConfig::default();
        let config = TriggerConfig {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            publish_time: self.publish_time.unwrap_or(defaults.publish_time),
            timezone: self.timezone.unwrap_or(defaults.timezone),
            publish_on_startup: self.publish_on_startup.unwrap_or(defaults.publish_on_startup),
        };
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Trigger Events
// ============================================================================

/// Events emitted by the trigger
#[derive(Debug, Clone)]
pub enum TriggerEvent {
    /// A shuffle was written
    Published {
        entry_number: u64,
        document_key: String,
        reason: String,
    },

    /// A publish invocation failed; the next period will try again
    PublishFailed { reason: String, error: String },
}

// ============================================================================
// Publish Trigger
// ============================================================================

/// Runs the publisher once per day
pub struct PublishTrigger {
    config: TriggerConfig,
    publisher: ScheduledPublisher,
    event_sender: broadcast::Sender<TriggerEvent>,
    is_running: Arc<RwLock<bool>>,
    /// Publish instant of the last period the loop fired for
    last_scheduled: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl PublishTrigger {
    /// Create a new publish trigger
    pub fn new(config: TriggerConfig, publisher: ScheduledPublisher) -> Result<Self> {
        config.validate()?;

        let (event_sender, _) = broadcast::channel(16);

        Ok(Self {
            config,
            publisher,
            event_sender,
            is_running: Arc::new(RwLock::new(false)),
            last_scheduled: Arc::new(RwLock::new(None)),
        })
    }

    /// Subscribe to trigger events
    pub fn subscribe(&self) -> broadcast::Receiver<TriggerEvent> {
        self.event_sender.subscribe()
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// Next publish instant strictly after `now`
    pub fn next_publish_after(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let publish_time = self.config.parse_publish_time()?;
        let zone = self.config.timezone;
        let today = zone.date_of(now);

        let candidate = zone.resolve(today.and_time(publish_time));
        if candidate > now {
            return Ok(candidate);
        }

        let tomorrow = today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| Error::config("publish date out of range"))?;
        Ok(zone.resolve(tomorrow.and_time(publish_time)))
    }

    /// Next publish instant for the loop, given the last period it fired for.
    ///
    /// The loop sleeps on the monotonic clock but reads the wall clock on
    /// wake-up, and the two can disagree. Anchoring on `last_fired` keeps a
    /// lagging wall clock from scheduling the same period twice.
    pub fn next_scheduled_publish(
        &self,
        now: DateTime<Utc>,
        last_fired: Option<DateTime<Utc>>,
    ) -> Result<DateTime<Utc>> {
        let from = last_fired.map_or(now, |last| last.max(now));
        self.next_publish_after(from)
    }

    /// Duration from `now` until the next publish
    pub fn duration_until_publish(&self, now: DateTime<Utc>) -> Result<Duration> {
        Ok(self.next_publish_after(now)?.signed_duration_since(now))
    }

    /// Start the trigger loop (runs until stopped)
    pub async fn start(&self) -> Result<()> {
        *self.is_running.write().await = true;

        tracing::info!(
            publish_time = %self.config.publish_time,
            timezone = %self.config.timezone,
            "Publish trigger started"
        );

        if self.config.publish_on_startup {
            self.fire("startup").await;
        }

        while *self.is_running.read().await {
            let now = Utc::now();
            let last_fired = *self.last_scheduled.read().await;
            let target = self.next_scheduled_publish(now, last_fired)?;
            let sleep_duration = target.signed_duration_since(now);
            tracing::debug!(
                seconds = sleep_duration.num_seconds(),
                next = %target,
                "Sleeping until next publish"
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration.to_std().unwrap_or(std::time::Duration::from_secs(60))) => {
                    *self.last_scheduled.write().await = Some(target);
                    self.fire("schedule").await;
                }
                _ = self.wait_for_stop() => {
                    break;
                }
            }
        }

        tracing::info!("Publish trigger stopped");
        Ok(())
    }

    /// Stop the trigger loop
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
    }

    /// Check if trigger is running
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    /// Publish now, outside the schedule
    pub async fn force_publish(&self) -> Result<()> {
        let record = self.publisher.publish().await?;
        let _ = self.event_sender.send(TriggerEvent::Published {
            entry_number: record.entry_number(),
            document_key: record.document_key,
            reason: "manual".to_string(),
        });
        Ok(())
    }

    // Internal: Wait for stop signal
    async fn wait_for_stop(&self) {
        loop {
            if !*self.is_running.read().await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    }

    // Internal: One invocation; errors end here and wait for the next period
    async fn fire(&self, reason: &str) {
        let event = match self.publisher.publish().await {
            Ok(record) => TriggerEvent::Published {
                entry_number: record.entry_number(),
                document_key: record.document_key,
                reason: reason.to_string(),
            },
            Err(e) => {
                tracing::warn!(reason, error = %e, "Publish skipped for this period");
                TriggerEvent::PublishFailed {
                    reason: reason.to_string(),
                    error: e.to_string(),
                }
            }
        };
        let _ = self.event_sender.send(event);
    }
}

// ============================================================================
// Tests
// ============================================================================
