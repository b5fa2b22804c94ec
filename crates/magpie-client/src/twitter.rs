//! Twitter API v2 client
//!
//! One reqwest client, bearer-token auth, typed request/response bodies.
//! Each method makes a single attempt and maps the HTTP status onto the
//! failure taxonomy: 429 is rate-limited (with the server's `retry-after`
//! hint when present), 5xx is transient, everything else is fatal.

use crate::traits::SocialClient;
use crate::types::{
    CreateTweetRequest, TweetReply, TwitterMentionsResponse, TwitterTweet, TwitterUserResponse,
};
use async_trait::async_trait;
use magpie_core::{ApiError, MagpieError, Mention, Result};
use std::time::Duration;

const TWITTER_API_URL: &str = "https://api.twitter.com/2";

/// Twitter client for mention polling and reply posting
pub struct TwitterClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl TwitterClient {
    /// Create a client with the given OAuth2 user access token and
    /// per-request timeout
    pub fn new(token: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MagpieError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            token,
            base_url: TWITTER_API_URL.to_string(),
        })
    }

    /// Classify a non-success response into the failure taxonomy
    async fn classify_response(response: reqwest::Response) -> ApiError {
        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return ApiError::RateLimited { retry_after };
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown".to_string());

        if status.is_server_error() {
            ApiError::Transient(format!("Twitter API error {}: {}", status, body))
        } else {
            ApiError::Fatal(format!("Twitter API error {}: {}", status, body))
        }
    }

    /// Map a request-level failure (connect, timeout) onto the taxonomy
    fn classify_send_error(err: reqwest::Error) -> ApiError {
        ApiError::Transient(format!("Failed to send request: {}", err))
    }
}

#[async_trait]
impl SocialClient for TwitterClient {
    async fn authenticate(&self) -> std::result::Result<String, ApiError> {
        let response = self
            .http
            .get(format!("{}/users/me", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        if !response.status().is_success() {
            return Err(Self::classify_response(response).await);
        }

        let user: TwitterUserResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Fatal(format!("Failed to parse response: {}", e)))?;

        let user = user
            .data
            .ok_or_else(|| ApiError::Fatal("Could not get user data".to_string()))?;

        tracing::info!("Logged in as @{}", user.username);
        Ok(user.id)
    }

    async fn fetch_mentions_since(
        &self,
        account_id: &str,
        since_id: Option<&str>,
        max_results: u32,
    ) -> std::result::Result<Vec<Mention>, ApiError> {
        let mut request = self
            .http
            .get(format!("{}/users/{}/mentions", self.base_url, account_id))
            .bearer_auth(&self.token)
            .query(&[
                ("max_results", max_results.to_string()),
                ("tweet.fields", "author_id".to_string()),
            ]);

        if let Some(id) = since_id {
            request = request.query(&[("since_id", id)]);
        }

        let response = request.send().await.map_err(Self::classify_send_error)?;

        if !response.status().is_success() {
            return Err(Self::classify_response(response).await);
        }

        let mentions: TwitterMentionsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Fatal(format!("Failed to parse response: {}", e)))?;

        let tweets = mentions.data.unwrap_or_default();
        Ok(tweets.into_iter().map(tweet_to_mention).collect())
    }

    async fn resolve_username(&self, user_id: &str) -> std::result::Result<String, ApiError> {
        let response = self
            .http
            .get(format!("{}/users/{}", self.base_url, user_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        if !response.status().is_success() {
            return Err(Self::classify_response(response).await);
        }

        let user: TwitterUserResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Fatal(format!("Failed to parse response: {}", e)))?;

        user.data
            .map(|u| u.username)
            .ok_or_else(|| ApiError::Fatal(format!("No user data for id {}", user_id)))
    }

    async fn post_reply(
        &self,
        text: &str,
        in_reply_to_id: &str,
    ) -> std::result::Result<(), ApiError> {
        let body = CreateTweetRequest {
            text: text.to_string(),
            reply: Some(TweetReply {
                in_reply_to_tweet_id: in_reply_to_id.to_string(),
            }),
        };

        let response = self
            .http
            .post(format!("{}/tweets", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(Self::classify_send_error)?;

        if !response.status().is_success() {
            return Err(Self::classify_response(response).await);
        }

        Ok(())
    }
}

fn tweet_to_mention(tweet: TwitterTweet) -> Mention {
    Mention {
        author_id: tweet.author_id.unwrap_or_default(),
        id: tweet.id,
        text: tweet.text,
    }
}
