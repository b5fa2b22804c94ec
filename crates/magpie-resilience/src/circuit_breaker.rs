//! Circuit breaker for remote API protection
//!
//! Implements the circuit breaker pattern to stop hammering a failing
//! downstream service and probe for recovery after a cooldown.

use magpie_core::BreakerConfig;
use serde::Serialize;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    /// Normal operation - requests allowed
    Closed,
    /// Too many failures - reject requests immediately
    Open,
    /// Cooldown elapsed - allow a probe to test recovery
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "closed"),
            CircuitState::Open => write!(f, "open"),
            CircuitState::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Circuit breaker shared by every remote call in the process
///
/// # States
///
/// - **Closed**: normal operation, all requests allowed
/// - **Open**: the failure threshold was reached; reject requests until the
///   recovery timeout elapses
/// - **HalfOpen**: cooldown elapsed; requests are allowed again and the
///   next recorded result decides between Closed and Open
///
/// A success in any state resets the failure count, which forces Closed. A
/// breaker that reached its threshold without a recorded failure time is
/// treated as immediately probeable rather than stuck open.
///
/// # Example
///
/// ```
/// use magpie_resilience::CircuitBreaker;
///
/// let cb = CircuitBreaker::new(3, std::time::Duration::from_secs(60));
///
/// cb.record_failure();
/// cb.record_failure();
/// cb.record_failure();
///
/// // Circuit is now open
/// assert!(!cb.can_execute());
/// ```
pub struct CircuitBreaker {
    failure_count: AtomicU32,
    last_failure: AtomicU64, // Unix timestamp millis, 0 = never
    threshold: u32,
    recovery_timeout: Duration,
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    ///
    /// # Arguments
    ///
    /// * `threshold` - Consecutive failures before the circuit opens
    /// * `recovery_timeout` - Cooldown before a recovery probe is allowed
    pub fn new(threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_count: AtomicU32::new(0),
            last_failure: AtomicU64::new(0),
            threshold,
            recovery_timeout,
        }
    }

    /// Create a circuit breaker from the bot configuration
    pub fn from_config(config: &BreakerConfig) -> Self {
        Self::new(config.failure_threshold, config.recovery_timeout())
    }

    /// Get the current circuit state
    pub fn state(&self) -> CircuitState {
        let failures = self.failure_count.load(Ordering::Relaxed);

        if failures < self.threshold {
            return CircuitState::Closed;
        }

        // At or over threshold - check whether the cooldown has elapsed
        let last_failure = self.last_failure.load(Ordering::Relaxed);
        if last_failure == 0 {
            // No recorded failure time; allow a probe rather than wedging
            return CircuitState::HalfOpen;
        }

        let elapsed = epoch_millis().saturating_sub(last_failure);

        if elapsed >= self.recovery_timeout.as_millis() as u64 {
            CircuitState::HalfOpen
        } else {
            CircuitState::Open
        }
    }

    /// Record a successful operation (resets the circuit to closed)
    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
    }

    /// Record a failed operation
    ///
    /// Reaching the threshold opens the circuit; a failure while half-open
    /// re-opens it with a refreshed cooldown.
    pub fn record_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.last_failure.store(epoch_millis(), Ordering::Relaxed);

        if failures == self.threshold {
            tracing::warn!("Circuit breaker opened after {} failures", failures);
        }
    }

    /// Check if a request can be executed
    ///
    /// Returns `true` for closed and half-open (recovery probe) states,
    /// `false` while the circuit is open.
    pub fn can_execute(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        }
    }

    /// Get the current failure count (for monitoring)
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Get time until the next recovery probe (ms), 0 if not open
    pub fn time_until_retry(&self) -> u64 {
        match self.state() {
            CircuitState::Open => {
                let last_failure = self.last_failure.load(Ordering::Relaxed);
                let elapsed = epoch_millis().saturating_sub(last_failure);
                (self.recovery_timeout.as_millis() as u64).saturating_sub(elapsed)
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_initial_state_closed() {
        let cb = CircuitBreaker::new(5, Duration::from_secs(60));
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.can_execute());
    }

    #[test]
    fn test_opens_after_threshold() {
        let cb = CircuitBreaker::new(3, Duration::from_secs(60));

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.can_execute());
    }

    #[test]
    fn test_success_resets_failures() {
        let cb = CircuitBreaker::new(3, Duration::from_secs(60));

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.failure_count(), 2);

        cb.record_success();
        assert_eq!(cb.failure_count(), 0);
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_after_timeout() {
        let cb = CircuitBreaker::new(2, Duration::from_secs(1));

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        sleep(Duration::from_millis(1100));
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(cb.can_execute());
    }

    #[test]
    fn test_half_open_recovers_on_success() {
        let cb = CircuitBreaker::new(2, Duration::from_secs(1));

        cb.record_failure();
        cb.record_failure();
        sleep(Duration::from_millis(1100));
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
    }

    #[test]
    fn test_half_open_reopens_on_failure() {
        let cb = CircuitBreaker::new(2, Duration::from_secs(1));

        cb.record_failure();
        cb.record_failure();
        sleep(Duration::from_millis(1100));
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        // Failed probe refreshes the cooldown
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.can_execute());
    }

    #[test]
    fn test_time_until_retry() {
        let cb = CircuitBreaker::new(2, Duration::from_secs(2));

        cb.record_failure();
        cb.record_failure();

        let time_remaining = cb.time_until_retry();
        assert!(time_remaining > 0);
        assert!(time_remaining <= 2000);
    }

    #[test]
    fn test_state_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&CircuitState::HalfOpen).unwrap(),
            "\"half-open\""
        );
    }
}
