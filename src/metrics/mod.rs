//! Prometheus metrics for the shuffle publisher and read endpoint
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! Until then (or if registration fails) every recording function is a no-op.

use prometheus::{register_counter, register_counter_vec, Counter, CounterVec, Encoder, TextEncoder};
use std::sync::{Mutex, OnceLock};

/// Container for all shuffle metrics
struct ShuffleMetrics {
    publish_total: Counter,
    publish_failures: Counter,
    queries: CounterVec,
}

static SHUFFLE_METRICS: OnceLock<ShuffleMetrics> = OnceLock::new();

/// Serializes registration so concurrent callers never register twice
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Outcome label for a read request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// A persisted shuffle was returned
    Latest,
    /// The store was empty; the identity fallback was returned
    Fallback,
    /// The store could not be read
    Error,
}

impl QueryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Fallback => "fallback",
            Self::Error => "error",
        }
    }
}

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK
        .lock()
        .map_err(|_| prometheus::Error::Msg("metrics init lock poisoned".to_string()))?;
    if SHUFFLE_METRICS.get().is_some() {
        return Ok(());
    }

    let metrics = ShuffleMetrics {
        publish_total: register_counter!(
            "daily_shuffle_publish_total",
            "Total number of shuffles published"
        )?,
        publish_failures: register_counter!(
            "daily_shuffle_publish_failures_total",
            "Total number of failed publish invocations"
        )?,
        queries: register_counter_vec!(
            "daily_shuffle_query_total",
            "Total read requests by outcome",
            &["result"]
        )?,
    };

    SHUFFLE_METRICS.set(metrics).ok();

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    SHUFFLE_METRICS.get().is_some()
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Record a successful publish
pub fn record_publish() {
    if let Some(m) = SHUFFLE_METRICS.get() {
        m.publish_total.inc();
    }
}

/// Record a failed publish
pub fn record_publish_failure() {
    if let Some(m) = SHUFFLE_METRICS.get() {
        m.publish_failures.inc();
    }
}

/// Record a read request
pub fn record_query(outcome: QueryOutcome) {
    if let Some(m) = SHUFFLE_METRICS.get() {
        m.queries.with_label_values(&[outcome.as_str()]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_metrics().unwrap();
        init_metrics().unwrap();
        assert!(metrics_initialized());
    }

    #[test]
    fn test_encode_contains_counters() {
        init_metrics().unwrap();
        record_publish();
        record_query(QueryOutcome::Fallback);

        let text = encode_metrics().unwrap();
        assert!(text.contains("daily_shuffle_publish_total"));
        assert!(text.contains("daily_shuffle_query_total{result=\"fallback\"}"));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(QueryOutcome::Latest.as_str(), "latest");
        assert_eq!(QueryOutcome::Error.as_str(), "error");
    }
}
