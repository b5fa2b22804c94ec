//! Reply pipeline - one polling cycle
//!
//! Fetch new mentions since the watermark, then for each one: resolve the
//! author, compose a reply, validate it, post it, and persist the new
//! watermark. Every remote call goes through the retry wrapper with the
//! shared metrics and circuit breaker attached. A failure on one mention
//! never aborts the batch; the watermark only advances past mentions that
//! were actually answered.

use crate::shutdown::ShutdownSignal;
use crate::state::BotState;
use crate::text;
use magpie_client::{ReplyModel, SocialClient};
use magpie_core::{ApiError, BotConfig, Mention, Result};
use magpie_resilience::{call_with_retry, BotMetrics, CallOutcome, CircuitBreaker, RetryPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Executes one unit of work per supervisor cycle
pub struct ReplyPipeline {
    social: Arc<dyn SocialClient>,
    model: Arc<dyn ReplyModel>,
    metrics: Arc<BotMetrics>,
    breaker: Arc<CircuitBreaker>,
    policy: RetryPolicy,
    config: BotConfig,
    state_path: PathBuf,
    account_id: String,
    state: BotState,
}

impl ReplyPipeline {
    pub fn new(
        config: &BotConfig,
        account_id: String,
        social: Arc<dyn SocialClient>,
        model: Arc<dyn ReplyModel>,
        metrics: Arc<BotMetrics>,
        breaker: Arc<CircuitBreaker>,
        state: BotState,
    ) -> Self {
        Self {
            social,
            model,
            metrics,
            breaker,
            policy: RetryPolicy::from(&config.retry),
            state_path: PathBuf::from(&config.state_file),
            config: config.clone(),
            account_id,
            state,
        }
    }

    /// Current persisted state (the mention watermark)
    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Run one polling cycle
    ///
    /// Returns `Err` only for non-retryable faults surfaced by the fetch;
    /// per-mention failures are recorded and swallowed.
    pub async fn run_cycle(&mut self, shutdown: &ShutdownSignal) -> Result<()> {
        // Batch-level short-circuit: a cycle that cannot call anything
        // should not fetch anything either
        if !self.breaker.can_execute() {
            warn!("Circuit breaker open, skipping mention check");
            return Ok(());
        }

        let mentions = self.fetch_mentions().await?;

        if mentions.is_empty() {
            info!("No new mentions");
            return Ok(());
        }

        info!("Found {} new mention(s)", mentions.len());

        let last_index = mentions.len() - 1;
        for (index, mention) in mentions.iter().enumerate() {
            if shutdown.is_requested() {
                break;
            }

            if self.process_mention(mention).await {
                self.state.last_mention_id = Some(mention.id.clone());
                if let Err(e) = self.state.save(&self.state_path) {
                    error!("Could not save state: {}", e);
                }
            }

            // Pace replies within the batch, but not after the last one
            if index < last_index && !shutdown.is_requested() {
                shutdown.sleep(self.config.reply.delay()).await;
            }
        }

        Ok(())
    }

    /// Fetch new mentions since the watermark, oldest-first
    async fn fetch_mentions(&self) -> Result<Vec<Mention>> {
        let since_id = self.state.last_mention_id.clone();
        let outcome = call_with_retry(
            &self.policy,
            Some(&self.metrics),
            Some(&self.breaker),
            || {
                let since = since_id.clone();
                async move {
                    self.social
                        .fetch_mentions_since(
                            &self.account_id,
                            since.as_deref(),
                            self.config.poll.batch_size,
                        )
                        .await
                }
            },
        )
        .await?;

        let mut mentions = outcome.into_option().unwrap_or_default();
        // The platform returns newest-first; reply in arrival order
        mentions.reverse();
        Ok(mentions)
    }

    /// Process a single mention; returns true if a reply was posted
    async fn process_mention(&self, mention: &Mention) -> bool {
        let author = self.resolve_author(&mention.author_id).await;
        info!("New mention from @{}: {}", author, mention.text);

        let reply = match self.compose_reply(&mention.text, &author).await {
            Some(reply) => reply,
            None => {
                warn!("Could not generate reply for mention {}", mention.id);
                self.metrics.record_failure();
                return false;
            }
        };

        if let Err(invalid) = text::validate(&reply, self.config.reply.max_length) {
            error!("Invalid reply text: {}", invalid);
            self.metrics.record_failure();
            return false;
        }

        if self.post_reply(&reply, &mention.id).await {
            info!("Replied: {}", reply);
            self.metrics.record_mention_processed();
            true
        } else {
            false
        }
    }

    /// Resolve the author's username, falling back to the raw id
    async fn resolve_author(&self, author_id: &str) -> String {
        let result = call_with_retry(
            &self.policy,
            Some(&self.metrics),
            Some(&self.breaker),
            || async move { self.social.resolve_username(author_id).await },
        )
        .await;

        match result {
            Ok(CallOutcome::Completed(username)) => username,
            Ok(_) => author_id.to_string(),
            Err(e) => {
                debug!("Username lookup failed for {}: {}", author_id, e);
                author_id.to_string()
            }
        }
    }

    /// Compose a reply via the model, truncated to the platform limit
    async fn compose_reply(&self, mention_text: &str, author: &str) -> Option<String> {
        if mention_text.trim().is_empty() {
            warn!("Empty mention text received");
            return None;
        }

        let result = call_with_retry(
            &self.policy,
            Some(&self.metrics),
            Some(&self.breaker),
            || async move { self.model.generate(mention_text, author).await },
        )
        .await;

        match result {
            Ok(outcome) => outcome
                .into_option()
                .map(|raw| text::truncate(&raw, self.config.reply.max_length)),
            Err(e) => {
                error!("Reply generation failed: {}", e);
                None
            }
        }
    }

    /// Post the reply; records success or failure metrics
    async fn post_reply(&self, reply: &str, in_reply_to_id: &str) -> bool {
        let result: std::result::Result<CallOutcome<()>, ApiError> = call_with_retry(
            &self.policy,
            Some(&self.metrics),
            Some(&self.breaker),
            || async move { self.social.post_reply(reply, in_reply_to_id).await },
        )
        .await;

        match result {
            Ok(outcome) if outcome.is_completed() => {
                self.metrics.record_reply_sent();
                self.metrics.record_success();
                true
            }
            Ok(_) => {
                self.metrics.record_failure();
                false
            }
            Err(e) => {
                error!("Could not post reply: {}", e);
                self.metrics.record_failure();
                false
            }
        }
    }
}
