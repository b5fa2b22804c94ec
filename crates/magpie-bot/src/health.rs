//! Health snapshot for external monitors
//!
//! The report is a plain serializable value; serving it over a protocol is
//! out of scope, so the supervisor just logs it as JSON on shutdown and
//! callers can poll [`HealthReport::collect`] however they like.

use magpie_resilience::{BotMetrics, CircuitBreaker, CircuitState, MetricsSnapshot};
use serde::Serialize;

/// Point-in-time view of the bot's operational health
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
    pub circuit_breaker_state: CircuitState,
    pub running: bool,
}

impl HealthReport {
    /// Assemble a report from the shared metrics and breaker
    pub fn collect(metrics: &BotMetrics, breaker: &CircuitBreaker, running: bool) -> Self {
        Self {
            metrics: metrics.snapshot(),
            circuit_breaker_state: breaker.state(),
            running,
        }
    }
}
