//! Conversation title derivation.

use serde::{Deserialize, Serialize};

/// Rule used to turn the first user message into a sidebar title.
///
/// Truncation counts Unicode scalar values (`char`s), not bytes and not
/// grapheme clusters: multi-byte characters are never split, combining
/// sequences may be.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TitleRule {
    /// Characters kept from the message content.
    pub max_chars: usize,
    /// Marker appended when the content was cut.
    pub ellipsis: String,
    /// Title used while there is nothing to derive from.
    pub placeholder: String,
}

impl Default for TitleRule {
    fn default() -> Self {
        Self {
            max_chars: 30,
            ellipsis: "...".to_string(),
            placeholder: "New chat".to_string(),
        }
    }
}

impl TitleRule {
    /// Derive a title from message content.
    #[must_use]
    pub fn derive(&self, content: &str) -> String {
        if content.is_empty() {
            return self.placeholder.clone();
        }

        let mut chars = content.chars();
        let mut title: String = chars.by_ref().take(self.max_chars).collect();
        if chars.next().is_some() {
            title.push_str(&self.ellipsis);
        }
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_kept_verbatim() {
        let rule = TitleRule::default();
        assert_eq!(rule.derive("Hello there"), "Hello there");
    }

    #[test]
    fn test_exactly_max_chars_has_no_ellipsis() {
        let rule = TitleRule::default();
        let content = "x".repeat(30);
        assert_eq!(rule.derive(&content), content);
    }

    #[test]
    fn test_long_content_truncated_with_ellipsis() {
        let rule = TitleRule::default();
        let content = "abcdefghijklmnopqrstuvwxyz0123456789";
        assert_eq!(rule.derive(content), "abcdefghijklmnopqrstuvwxyz0123...");
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let rule = TitleRule::default();
        let content = "안녕하세요".repeat(7);
        let title = rule.derive(&content);
        assert_eq!(title.chars().count(), 33);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_empty_content_uses_placeholder() {
        let rule = TitleRule::default();
        assert_eq!(rule.derive(""), "New chat");
    }
}
