//! # magpie-client
//!
//! Remote-service adapters for Magpie.
//!
//! The pipeline only ever sees the [`SocialClient`] and [`ReplyModel`]
//! traits; the concrete [`TwitterClient`] and [`ClaudeClient`] implement
//! them over reqwest with classified errors ([`magpie_core::ApiError`]) so
//! the resilience layer can decide what to retry. No retry logic lives
//! here - clients make exactly one attempt per call.

mod auth;
mod claude;
mod traits;
mod twitter;
mod types;

pub use auth::{anthropic_api_key, twitter_token, Credentials};
pub use claude::ClaudeClient;
pub use traits::{ReplyModel, SocialClient};
pub use twitter::TwitterClient;
pub use types::*;
