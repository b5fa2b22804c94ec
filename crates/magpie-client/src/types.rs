//! Wire types for the remote APIs

use serde::{Deserialize, Serialize};

// --- Twitter API v2 ---

/// A user object as returned by `/2/users/*`
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUser {
    pub id: String,
    pub username: String,
}

/// Envelope for single-user lookups
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterUserResponse {
    pub data: Option<TwitterUser>,
}

/// A tweet in the mentions timeline
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterTweet {
    pub id: String,
    #[serde(default)]
    pub author_id: Option<String>,
    pub text: String,
}

/// Envelope for the mentions timeline; `data` is absent when there are no
/// new mentions
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterMentionsResponse {
    #[serde(default)]
    pub data: Option<Vec<TwitterTweet>>,
}

/// Request body for `POST /2/tweets`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTweetRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<TweetReply>,
}

/// Reply threading for `POST /2/tweets`
#[derive(Debug, Clone, Serialize)]
pub struct TweetReply {
    pub in_reply_to_tweet_id: String,
}

// --- Anthropic Messages API ---

/// Anthropic API message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// Anthropic API request format
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<AnthropicMessage>,
}

/// One content block of an Anthropic response
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicContent {
    #[serde(default)]
    pub text: String,
}

/// Anthropic API response format
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicContent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tweet_request_with_reply() {
        let request = CreateTweetRequest {
            text: "hello".to_string(),
            reply: Some(TweetReply {
                in_reply_to_tweet_id: "1001".to_string(),
            }),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["text"], "hello");
        assert_eq!(json["reply"]["in_reply_to_tweet_id"], "1001");
    }

    #[test]
    fn test_create_tweet_request_without_reply_omits_field() {
        let request = CreateTweetRequest {
            text: "hello".to_string(),
            reply: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("reply").is_none());
    }

    #[test]
    fn test_mentions_response_without_data() {
        let response: TwitterMentionsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.data.is_none());
    }

    #[test]
    fn test_mentions_response_with_tweets() {
        let body = r#"{"data": [{"id": "2", "author_id": "7", "text": "hi"}]}"#;
        let response: TwitterMentionsResponse = serde_json::from_str(body).unwrap();
        let tweets = response.data.unwrap();
        assert_eq!(tweets.len(), 1);
        assert_eq!(tweets[0].author_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_anthropic_response_parses_content() {
        let body = r#"{"content": [{"type": "text", "text": "a reply"}]}"#;
        let response: AnthropicResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.content[0].text, "a reply");
    }
}
