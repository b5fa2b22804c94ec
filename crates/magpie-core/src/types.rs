//! Shared domain types

use serde::{Deserialize, Serialize};

/// An inbound mention of the bot's account
///
/// Read-only to the core: identifiers are opaque strings exactly as the
/// platform returned them, and `id` doubles as the watermark value once the
/// mention has been answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Platform identifier of the mention itself
    pub id: String,
    /// Platform identifier of the author
    pub author_id: String,
    /// Message text
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_round_trip() {
        let mention = Mention {
            id: "1001".to_string(),
            author_id: "42".to_string(),
            text: "hello @magpie".to_string(),
        };

        let json = serde_json::to_string(&mention).unwrap();
        let back: Mention = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mention);
    }
}
