//! Reply text shaping
//!
//! Length handling is character-based, matching how the platform counts.
//! Truncation prefers a word boundary when one exists past half the limit,
//! and strips trailing punctuation so the marker never reads "!...".

/// Marker appended to truncated replies
const TRUNCATION_MARKER: &str = "...";

/// Punctuation stripped before the truncation marker
const TRAILING_PUNCTUATION: [char; 5] = ['.', ',', '!', '?', ' '];

/// Truncate `text` to at most `max_length` characters without cutting words
///
/// Text at or under the limit is returned trimmed but otherwise unchanged.
/// Truncated text ends with `...`; the cut happens at the last space when
/// that loses no more than half the limit, so the final word stays whole.
pub fn truncate(text: &str, max_length: usize) -> String {
    let trimmed = text.trim();
    let chars: Vec<char> = trimmed.chars().collect();

    if chars.len() <= max_length {
        return trimmed.to_string();
    }

    // Reserve space for the marker
    let mut cut = &chars[..max_length.saturating_sub(TRUNCATION_MARKER.len())];

    // Break at the last space unless that loses too much
    if let Some(last_space) = cut.iter().rposition(|c| *c == ' ') {
        if last_space > max_length / 2 {
            cut = &cut[..last_space];
        }
    }

    let mut result: String = cut.iter().collect();
    while result.ends_with(TRAILING_PUNCTUATION) {
        result.pop();
    }

    result.push_str(TRUNCATION_MARKER);
    result
}

/// Why a reply failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReply {
    /// Text is the empty string
    Empty,
    /// Text contains only whitespace
    WhitespaceOnly,
    /// Text exceeds the platform limit
    TooLong { length: usize, limit: usize },
}

impl std::fmt::Display for InvalidReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReply::Empty => write!(f, "reply text is empty"),
            InvalidReply::WhitespaceOnly => write!(f, "reply text contains only whitespace"),
            InvalidReply::TooLong { length, limit } => {
                write!(f, "reply is {} characters, exceeds limit of {}", length, limit)
            }
        }
    }
}

/// Validate reply text before posting
pub fn validate(text: &str, max_length: usize) -> Result<(), InvalidReply> {
    if text.is_empty() {
        return Err(InvalidReply::Empty);
    }

    if text.trim().is_empty() {
        return Err(InvalidReply::WhitespaceOnly);
    }

    let length = text.chars().count();
    if length > max_length {
        return Err(InvalidReply::TooLong {
            length,
            limit: max_length,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 280;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate("Hello world!", LIMIT), "Hello world!");
    }

    #[test]
    fn test_exact_limit_unchanged() {
        let text = "a".repeat(LIMIT);
        assert_eq!(truncate(&text, LIMIT), text);
    }

    #[test]
    fn test_long_text_truncated_with_marker() {
        let text = "a".repeat(300);
        let result = truncate(&text, LIMIT);
        assert!(result.chars().count() <= LIMIT);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_preserves_whole_words() {
        let text = format!("This is a test {}", "word ".repeat(60));
        let result = truncate(&text, LIMIT);
        assert!(result.chars().count() <= LIMIT);

        // The character before the marker ends a whole word
        let without_marker = result.strip_suffix("...").unwrap();
        assert!(without_marker
            .chars()
            .last()
            .map(|c| c.is_alphanumeric())
            .unwrap_or(false));
    }

    #[test]
    fn test_strips_trailing_punctuation() {
        let text = format!("Hello, world! {}", "x".repeat(300));
        let result = truncate(&text, 20);
        assert!(!result.ends_with("!..."));
        assert!(!result.ends_with(",..."));
    }

    #[test]
    fn test_custom_limit() {
        let result = truncate("Hello world this is a test", 15);
        assert!(result.chars().count() <= 15);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(truncate("", LIMIT), "");
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(truncate("  hi  ", LIMIT), "hi");
    }

    #[test]
    fn test_no_space_past_half_limit_cuts_mid_word() {
        // One long token: no break point past half the limit, so the cut
        // is a hard one at limit - 3
        let text = "x".repeat(100);
        let result = truncate(&text, 20);
        assert_eq!(result, format!("{}...", "x".repeat(17)));
    }

    #[test]
    fn test_multibyte_text_counts_chars_not_bytes() {
        let text = "é".repeat(30);
        let result = truncate(&text, 20);
        assert!(result.chars().count() <= 20);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_validate_accepts_normal_text() {
        assert!(validate("Hello!", LIMIT).is_ok());
    }

    #[test]
    fn test_validate_accepts_exact_limit() {
        let text = "a".repeat(LIMIT);
        assert!(validate(&text, LIMIT).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(validate("", LIMIT), Err(InvalidReply::Empty));
    }

    #[test]
    fn test_validate_rejects_whitespace_only() {
        assert_eq!(validate("   \n\t", LIMIT), Err(InvalidReply::WhitespaceOnly));
    }

    #[test]
    fn test_validate_rejects_over_limit() {
        let text = "a".repeat(LIMIT + 1);
        assert_eq!(
            validate(&text, LIMIT),
            Err(InvalidReply::TooLong {
                length: LIMIT + 1,
                limit: LIMIT
            })
        );
    }
}
