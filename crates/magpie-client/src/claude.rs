//! Anthropic API client for reply composition

use crate::traits::ReplyModel;
use crate::types::{AnthropicMessage, AnthropicRequest, AnthropicResponse};
use async_trait::async_trait;
use magpie_core::{ApiError, MagpieError, ModelConfig, Result};
use std::time::Duration;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude client that turns a mention into a reply
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: usize,
    system_prompt: String,
}

impl ClaudeClient {
    /// Create a client from the model configuration
    pub fn new(api_key: String, config: &ModelConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MagpieError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            model: config.name.clone(),
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        })
    }
}

#[async_trait]
impl ReplyModel for ClaudeClient {
    async fn generate(
        &self,
        text: &str,
        author_username: &str,
    ) -> std::result::Result<String, ApiError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: Some(self.system_prompt.clone()),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: format!("Message from @{}: {}", author_username, text),
            }],
        };

        let response = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Transient(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ApiError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());

            return if status.is_server_error() {
                Err(ApiError::Transient(format!(
                    "Anthropic API error {}: {}",
                    status, body
                )))
            } else {
                Err(ApiError::Fatal(format!(
                    "Anthropic API error {}: {}",
                    status, body
                )))
            };
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Fatal(format!("Failed to parse response: {}", e)))?;

        let reply = parsed
            .content
            .first()
            .ok_or_else(|| ApiError::Fatal("No content in response".to_string()))?
            .text
            .clone();

        tracing::debug!("Model produced {} chars", reply.len());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_config() {
        let config = ModelConfig::default();
        let client =
            ClaudeClient::new("sk-ant-test".to_string(), &config, Duration::from_secs(30)).unwrap();

        assert_eq!(client.model, config.name);
        assert_eq!(client.max_tokens, 1000);
    }
}
