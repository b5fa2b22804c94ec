//! # magpie-core
//!
//! Core types for the Magpie reply bot.
//!
//! Magpie is a single-process agent that watches a social-media account for
//! mentions, composes replies with a language model, and posts them back.
//! This crate holds what every other crate needs: the unified error type,
//! the remote-call failure classification, configuration, and the shared
//! domain types.

mod config;
mod error;
mod types;

pub use config::{
    BackoffConfig, BotConfig, BreakerConfig, ModelConfig, PollConfig, ReplyConfig, RetryConfig,
};
pub use error::{ApiError, MagpieError, Result};
pub use types::Mention;
