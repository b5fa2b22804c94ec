//! Client trait seams
//!
//! The pipeline and supervisor only ever talk to these traits. Production
//! wires in [`crate::TwitterClient`] and [`crate::ClaudeClient`]; tests
//! substitute scripted mocks.

use async_trait::async_trait;
use magpie_core::{ApiError, Mention};

/// The social-media collaborator: mention fetch, user lookup, posting
///
/// Every method makes exactly one attempt and classifies its failure; the
/// resilience layer decides whether to retry.
#[async_trait]
pub trait SocialClient: Send + Sync {
    /// Resolve the authenticated account's own id
    async fn authenticate(&self) -> Result<String, ApiError>;

    /// Fetch mentions newer than `since_id`, newest-first as the platform
    /// returns them, at most `max_results`
    async fn fetch_mentions_since(
        &self,
        account_id: &str,
        since_id: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<Mention>, ApiError>;

    /// Look up a display username by user id
    async fn resolve_username(&self, user_id: &str) -> Result<String, ApiError>;

    /// Post `text` as a reply to the given message
    async fn post_reply(&self, text: &str, in_reply_to_id: &str) -> Result<(), ApiError>;
}

/// The language-model collaborator: one prompt in, one reply out
#[async_trait]
pub trait ReplyModel: Send + Sync {
    /// Compose a reply to `text` written by `author_username`
    async fn generate(&self, text: &str, author_username: &str) -> Result<String, ApiError>;
}
