//! Operational health metrics
//!
//! One [`BotMetrics`] instance lives for the whole process run. The
//! pipeline and retry wrapper record outcomes into it; the supervisor reads
//! `consecutive_failures` to decide on loop-level backoff and exposes a
//! snapshot for external monitors.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Consecutive failures at which the bot stops reporting itself healthy
const UNHEALTHY_AFTER: u64 = 5;

/// Counters and timestamps describing bot health
///
/// All counters are atomics so a shared `Arc<BotMetrics>` can be recorded
/// into from anywhere without locking. Never persisted; reset only by
/// process restart.
pub struct BotMetrics {
    mentions_processed: AtomicU64,
    replies_sent: AtomicU64,
    errors_count: AtomicU64,
    rate_limits_hit: AtomicU64,
    retries_count: AtomicU64,
    consecutive_failures: AtomicU64,
    start_time: DateTime<Utc>,
    last_activity: AtomicU64, // Unix timestamp millis, 0 = never
}

impl BotMetrics {
    pub fn new() -> Self {
        Self {
            mentions_processed: AtomicU64::new(0),
            replies_sent: AtomicU64::new(0),
            errors_count: AtomicU64::new(0),
            rate_limits_hit: AtomicU64::new(0),
            retries_count: AtomicU64::new(0),
            consecutive_failures: AtomicU64::new(0),
            start_time: Utc::now(),
            last_activity: AtomicU64::new(0),
        }
    }

    fn touch(&self) {
        self.last_activity
            .store(Utc::now().timestamp_millis() as u64, Ordering::Relaxed);
    }

    /// Record a successful operation
    pub fn record_success(&self) {
        self.touch();
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    /// Record a failed operation
    pub fn record_failure(&self) {
        self.errors_count.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    /// Record a rate limit hit
    ///
    /// Does not touch `consecutive_failures`: a throttled call is not
    /// evidence the downstream service is broken.
    pub fn record_rate_limit(&self) {
        self.rate_limits_hit.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    /// Record a retry attempt
    pub fn record_retry(&self) {
        self.retries_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fully processed mention
    pub fn record_mention_processed(&self) {
        self.mentions_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a posted reply
    pub fn record_reply_sent(&self) {
        self.replies_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Current consecutive-failure count
    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    /// Bot uptime in seconds
    pub fn uptime_seconds(&self) -> f64 {
        (Utc::now() - self.start_time).num_milliseconds() as f64 / 1000.0
    }

    /// Snapshot of all counters plus the derived health flag
    pub fn snapshot(&self) -> MetricsSnapshot {
        let last_activity_millis = self.last_activity.load(Ordering::Relaxed);
        let last_activity = if last_activity_millis == 0 {
            None
        } else {
            Utc.timestamp_millis_opt(last_activity_millis as i64).single()
        };

        let consecutive_failures = self.consecutive_failures.load(Ordering::Relaxed);

        MetricsSnapshot {
            healthy: consecutive_failures < UNHEALTHY_AFTER,
            uptime_seconds: self.uptime_seconds(),
            mentions_processed: self.mentions_processed.load(Ordering::Relaxed),
            replies_sent: self.replies_sent.load(Ordering::Relaxed),
            errors_count: self.errors_count.load(Ordering::Relaxed),
            rate_limits_hit: self.rate_limits_hit.load(Ordering::Relaxed),
            retries_count: self.retries_count.load(Ordering::Relaxed),
            consecutive_failures,
            last_activity,
        }
    }
}

impl Default for BotMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the bot's health counters
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub healthy: bool,
    pub uptime_seconds: f64,
    pub mentions_processed: u64,
    pub replies_sent: u64,
    pub errors_count: u64,
    pub rate_limits_hit: u64,
    pub retries_count: u64,
    pub consecutive_failures: u64,
    /// ISO-8601 timestamp of the last recorded activity, absent before any
    pub last_activity: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zeroed_and_healthy() {
        let metrics = BotMetrics::new();
        let snapshot = metrics.snapshot();

        assert!(snapshot.healthy);
        assert_eq!(snapshot.errors_count, 0);
        assert_eq!(snapshot.consecutive_failures, 0);
        assert!(snapshot.last_activity.is_none());
    }

    #[test]
    fn test_success_resets_consecutive_failures() {
        let metrics = BotMetrics::new();

        metrics.record_failure();
        metrics.record_failure();
        metrics.record_failure();
        assert_eq!(metrics.consecutive_failures(), 3);

        metrics.record_success();
        assert_eq!(metrics.consecutive_failures(), 0);
        // errors_count keeps its history
        assert_eq!(metrics.snapshot().errors_count, 3);
    }

    #[test]
    fn test_unhealthy_after_five_consecutive_failures() {
        let metrics = BotMetrics::new();

        for _ in 0..4 {
            metrics.record_failure();
        }
        assert!(metrics.snapshot().healthy);

        metrics.record_failure();
        assert!(!metrics.snapshot().healthy);
    }

    #[test]
    fn test_rate_limit_does_not_touch_consecutive_failures() {
        let metrics = BotMetrics::new();

        metrics.record_failure();
        metrics.record_rate_limit();
        metrics.record_rate_limit();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.consecutive_failures, 1);
        assert_eq!(snapshot.rate_limits_hit, 2);
        assert!(snapshot.last_activity.is_some());
    }

    #[test]
    fn test_retry_only_increments_retry_count() {
        let metrics = BotMetrics::new();

        metrics.record_retry();
        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.retries_count, 1);
        assert_eq!(snapshot.errors_count, 0);
        // record_retry does not count as activity
        assert!(snapshot.last_activity.is_none());
    }

    #[test]
    fn test_throughput_counters() {
        let metrics = BotMetrics::new();

        metrics.record_mention_processed();
        metrics.record_reply_sent();
        metrics.record_mention_processed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.mentions_processed, 2);
        assert_eq!(snapshot.replies_sent, 1);
    }

    #[test]
    fn test_snapshot_serializes_last_activity_as_iso8601() {
        let metrics = BotMetrics::new();
        metrics.record_success();

        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        let last_activity = json["last_activity"].as_str().unwrap();
        // chrono serializes DateTime<Utc> as RFC 3339 / ISO-8601
        assert!(last_activity.contains('T'));
    }
}
