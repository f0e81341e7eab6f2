//! Daily shuffle scheduling
//!
//! # Overview
//!
//! Publishing is split in two so the same logic can be driven either by the
//! in-process trigger or by an external cron calling `daily-shuffle publish`:
//!
//! - [`publisher`] - one invocation writes one record (count + 1, shuffle, append)
//! - [`trigger`] - wakes once per day at `publish_time` and runs the publisher
//!
//! ```text
//!   ┌───────────────────┐     ┌────────────────────┐     ┌──────────────┐
//!   │  PublishTrigger   │────▶│ ScheduledPublisher │────▶│ ShuffleStore │
//!   │  (daily, HH:MM)   │     │  count, gen, append│     │   (append)   │
//!   └───────────────────┘     └────────────────────┘     └──────────────┘
//! ```
//!
//! Entry numbers are derived from `count_all() + 1` without any locking.
//! Two overlapping invocations can therefore write the same entry number
//! under different document keys.

pub mod publisher;
pub mod trigger;

pub use publisher::ScheduledPublisher;
pub use trigger::{PublishTrigger, TriggerConfig, TriggerConfigBuilder, TriggerEvent};
