//! Configuration management for Magpie
//!
//! This module provides the bot configuration loaded from `magpie.toml`:
//! polling cadence, reply shaping, retry policy, circuit breaker tuning,
//! loop backoff, and model selection. Credentials never live here; they are
//! resolved from the environment at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::Result;

/// Bot configuration
///
/// Loaded from `magpie.toml` next to the binary (or a path given with
/// `--config`). Every field has a default, so a missing file runs the bot
/// with stock tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Path of the JSON file holding the mention watermark
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Per-request timeout for remote HTTP calls, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Mention polling
    #[serde(default)]
    pub poll: PollConfig,

    /// Reply shaping and pacing
    #[serde(default)]
    pub reply: ReplyConfig,

    /// Retry policy for remote calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Circuit breaker tuning
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// Loop-level backoff after consecutive cycle failures
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Language model selection
    #[serde(default)]
    pub model: ModelConfig,
}

/// Mention polling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between mention checks
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,

    /// Maximum mentions fetched per cycle
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

/// Reply shaping and pacing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Platform character limit for a single reply
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Seconds between replies within one batch
    #[serde(default = "default_reply_delay_secs")]
    pub delay_secs: u64,
}

/// Retry policy for remote calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per call before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Seconds between attempts after a transient failure
    #[serde(default = "default_retry_delay_secs")]
    pub delay_secs: u64,

    /// Seconds to wait after a rate-limited failure
    #[serde(default = "default_rate_limit_delay_secs")]
    pub rate_limit_delay_secs: u64,
}

/// Circuit breaker tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures before the circuit opens
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Seconds before an open circuit allows a recovery probe
    #[serde(default = "default_recovery_timeout_secs")]
    pub recovery_timeout_secs: u64,
}

/// Loop-level backoff after consecutive cycle failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Seconds per consecutive failure
    #[serde(default = "default_backoff_multiplier_secs")]
    pub multiplier_secs: u64,

    /// Ceiling on the computed backoff, in seconds
    #[serde(default = "default_backoff_max_secs")]
    pub max_secs: u64,
}

/// Language model selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API model name
    #[serde(default = "default_model")]
    pub name: String,

    /// Maximum tokens per generated reply
    #[serde(default = "default_model_max_tokens")]
    pub max_tokens: usize,

    /// Persona instructions sent as the system prompt
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

// Default value providers
fn default_state_file() -> String {
    "magpie-state.json".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_batch_size() -> u32 {
    10
}

fn default_max_length() -> usize {
    280
}

fn default_reply_delay_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_rate_limit_delay_secs() -> u64 {
    15
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_recovery_timeout_secs() -> u64 {
    60
}

fn default_backoff_multiplier_secs() -> u64 {
    10
}

fn default_backoff_max_secs() -> u64 {
    300
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_model_max_tokens() -> usize {
    1000
}

fn default_system_prompt() -> String {
    "You are Magpie, a quick-witted voice replying to mentions on social media.\n\
     \n\
     Your personality:\n\
     - Conversational and concise\n\
     - Playful, with a dry sense of humor\n\
     - Curious about whatever people bring you\n\
     \n\
     Guidelines:\n\
     - Keep every reply under 280 characters\n\
     - Reply to the message, not about yourself\n\
     - If someone asks for something harmful, decline politely\n\
     - Emojis sparingly, if at all"
        .to_string()
}

impl BotConfig {
    /// Load configuration from the given TOML file, or use defaults if the
    /// file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content).map_err(|e| {
                crate::MagpieError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default configuration to the given path
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| crate::MagpieError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Per-request HTTP timeout
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl PollConfig {
    /// Wait between mention checks
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl ReplyConfig {
    /// Pause between replies within a batch
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl RetryConfig {
    /// Wait between attempts after a transient failure
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// Wait after a rate-limited failure
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_secs(self.rate_limit_delay_secs)
    }
}

impl BreakerConfig {
    /// Cooldown before an open circuit allows a recovery probe
    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_secs(self.recovery_timeout_secs)
    }
}

impl BackoffConfig {
    /// Backoff for the given consecutive-failure count, capped at the
    /// configured maximum
    pub fn delay_for(&self, consecutive_failures: u64) -> Duration {
        Duration::from_secs((consecutive_failures * self.multiplier_secs).min(self.max_secs))
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            http_timeout_secs: default_http_timeout_secs(),
            poll: PollConfig::default(),
            reply: ReplyConfig::default(),
            retry: RetryConfig::default(),
            breaker: BreakerConfig::default(),
            backoff: BackoffConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            delay_secs: default_reply_delay_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_retry_delay_secs(),
            rate_limit_delay_secs: default_rate_limit_delay_secs(),
        }
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_timeout_secs: default_recovery_timeout_secs(),
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            multiplier_secs: default_backoff_multiplier_secs(),
            max_secs: default_backoff_max_secs(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            max_tokens: default_model_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}
