//! Supervised polling loop
//!
//! Drives the pipeline once per poll interval for the life of the process.
//! A failed cycle is recorded and survived; repeated consecutive failures
//! earn an escalating backoff on top of the normal wait. Shutdown is
//! honored between cycles and inside every wait, never mid-cycle.

use crate::health::HealthReport;
use crate::pipeline::ReplyPipeline;
use crate::shutdown::ShutdownSignal;
use magpie_core::BotConfig;
use magpie_resilience::{BotMetrics, CircuitBreaker};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Consecutive cycle failures before the loop starts backing off
const BACKOFF_AFTER_FAILURES: u64 = 3;

/// Drives periodic pipeline execution until shutdown
pub struct Supervisor {
    pipeline: ReplyPipeline,
    metrics: Arc<BotMetrics>,
    breaker: Arc<CircuitBreaker>,
    config: BotConfig,
    shutdown: ShutdownSignal,
}

impl Supervisor {
    pub fn new(
        pipeline: ReplyPipeline,
        metrics: Arc<BotMetrics>,
        breaker: Arc<CircuitBreaker>,
        config: BotConfig,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            pipeline,
            metrics,
            breaker,
            config,
            shutdown,
        }
    }

    /// Current health, for external polling
    pub fn health(&self) -> HealthReport {
        HealthReport::collect(&self.metrics, &self.breaker, !self.shutdown.is_requested())
    }

    /// Run the loop until shutdown is requested
    ///
    /// Returns after the final health snapshot is logged; exiting the
    /// process is the caller's responsibility.
    pub async fn run(&mut self) {
        info!(
            "Checking mentions every {} seconds",
            self.config.poll.interval_secs
        );

        while !self.shutdown.is_requested() {
            match self.pipeline.run_cycle(&self.shutdown).await {
                Ok(()) => self.metrics.record_success(),
                Err(e) => {
                    error!("Cycle failed: {}", e);
                    self.metrics.record_failure();

                    let failures = self.metrics.consecutive_failures();
                    if failures >= BACKOFF_AFTER_FAILURES {
                        let backoff = self.config.backoff.delay_for(failures);
                        warn!(
                            "{} consecutive failures, backing off for {}s",
                            failures,
                            backoff.as_secs()
                        );
                        if !self.shutdown.sleep(backoff).await {
                            break;
                        }
                    }
                }
            }

            if !self.shutdown.sleep(self.config.poll.interval()).await {
                break;
            }
        }

        let report = self.health();
        match serde_json::to_string(&report) {
            Ok(json) => info!("Final health: {}", json),
            Err(e) => warn!("Could not serialize final health report: {}", e),
        }
        info!("Bot stopped");
    }
}
