//! Credential loading for remote services
//!
//! Both tokens come from the environment, never from the config file.
//! Missing credentials are a startup-fatal error: the bot refuses to enter
//! its loop rather than fail on the first call.

use magpie_core::{MagpieError, Result};
use std::env;

/// Environment variable holding the social-platform access token
pub const TWITTER_TOKEN_ENV: &str = "MAGPIE_TWITTER_TOKEN";

/// Environment variable holding the Anthropic API key
pub const ANTHROPIC_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Resolved API credentials
#[derive(Clone)]
pub struct Credentials {
    pub twitter_token: String,
    pub anthropic_api_key: String,
}

impl Credentials {
    /// Resolve all credentials from the environment, failing with one
    /// message that names every missing variable
    pub fn from_env() -> Result<Self> {
        let twitter_token = env::var(TWITTER_TOKEN_ENV).ok();
        let anthropic_api_key = env::var(ANTHROPIC_KEY_ENV).ok();

        match (twitter_token, anthropic_api_key) {
            (Some(twitter_token), Some(anthropic_api_key)) => Ok(Self {
                twitter_token,
                anthropic_api_key,
            }),
            (twitter_token, anthropic_api_key) => {
                let mut missing = Vec::new();
                if twitter_token.is_none() {
                    missing.push(TWITTER_TOKEN_ENV);
                }
                if anthropic_api_key.is_none() {
                    missing.push(ANTHROPIC_KEY_ENV);
                }
                Err(MagpieError::Auth(format!(
                    "Missing credentials: {}. Set them in the environment before starting.",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print token material
        f.debug_struct("Credentials")
            .field("twitter_token", &"<redacted>")
            .field("anthropic_api_key", &"<redacted>")
            .finish()
    }
}

/// Get the social-platform access token
pub fn twitter_token() -> Result<String> {
    env::var(TWITTER_TOKEN_ENV).map_err(|_| {
        MagpieError::Auth(format!(
            "No social-platform token found. Set {}=<OAuth2 user access token>",
            TWITTER_TOKEN_ENV
        ))
    })
}

/// Get the Anthropic API key
pub fn anthropic_api_key() -> Result<String> {
    env::var(ANTHROPIC_KEY_ENV).map_err(|_| {
        MagpieError::Auth(format!(
            "No Anthropic API key found. Set {}=sk-ant-...",
            ANTHROPIC_KEY_ENV
        ))
    })
}
