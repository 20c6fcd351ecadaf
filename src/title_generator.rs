//! Session title generation using the completion client
//!
//! Generates a short title from the first user message, falling back to the
//! message itself when the remote call fails or is too slow.

use crate::runtime::Completer;
use std::time::Duration;
use tokio::time::timeout;

const TITLE_PROMPT: &str = r#"Generate a very short (2-5 words) title for a chat that starts with the message below. Use the same language as the message. Output only the title, no quotes or punctuation. Examples:
- "عايز كنبة حمرا" -> كنبة حمراء
- "What chairs do you have?" -> Chair Options

Message:"#;

const TITLE_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_PROMPT_CHARS: usize = 500;
const MAX_TITLE_CHARS: usize = 60;
const FALLBACK_TITLE_CHARS: usize = 40;

/// Title for a session whose first message is `message_text`. Never fails.
pub async fn title_for(message_text: &str, completer: &dyn Completer) -> String {
    match generate_title(message_text, completer).await {
        Some(title) => title,
        None => fallback_title(message_text),
    }
}

/// Ask the remote model for a title.
///
/// Returns None if title generation fails (timeout, error, empty output).
async fn generate_title(message_text: &str, completer: &dyn Completer) -> Option<String> {
    let truncated = truncate_chars(message_text, MAX_PROMPT_CHARS);
    let prompt = format!("{TITLE_PROMPT}\n{truncated}");

    match timeout(TITLE_TIMEOUT, completer.complete(&prompt, "")).await {
        Ok(Ok(text)) => {
            let title = sanitize_title(&text);
            (!title.is_empty()).then_some(title)
        }
        Ok(Err(e)) => {
            tracing::warn!(kind = e.kind(), error = %e, "Title generation failed");
            None
        }
        Err(_) => {
            tracing::warn!("Title generation timed out");
            None
        }
    }
}

/// First characters of the message, whitespace collapsed
pub fn fallback_title(message_text: &str) -> String {
    let collapsed = message_text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(FALLBACK_TITLE_CHARS).collect()
}

/// Keep the first line, drop wrapping quotes, cap the length
fn sanitize_title(title: &str) -> String {
    let first_line = title.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let unquoted = first_line.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '«' | '»' | '*'));
    let collapsed = unquoted.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_TITLE_CHARS {
        return collapsed;
    }

    // Cut at a word boundary when one exists
    let truncated: String = collapsed.chars().take(MAX_TITLE_CHARS).collect();
    match truncated.rsplit_once(' ') {
        Some((head, _)) if !head.is_empty() => head.to_string(),
        _ => truncated,
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionError;
    use crate::runtime::testing::MockCompleter;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Chair Options"), "Chair Options");
        assert_eq!(sanitize_title("\"كنبة حمراء\"\n"), "كنبة حمراء");
        assert_eq!(sanitize_title("  Multiple   Spaces  "), "Multiple Spaces");
        assert_eq!(sanitize_title("\n\nSecond line wins\nthird"), "Second line wins");
    }

    #[test]
    fn test_sanitize_title_truncation() {
        let long_title = "This is a very long title that should be truncated at some point for sure";
        let result = sanitize_title(long_title);
        assert!(result.chars().count() <= MAX_TITLE_CHARS);
        assert!(!result.ends_with(' '));
    }

    #[test]
    fn test_fallback_title_counts_characters() {
        let text = "عايز كنبة حمرا كبيرة جدا للصالة بتاعتي الجديدة لو سمحت";
        let title = fallback_title(text);
        assert_eq!(title.chars().count(), FALLBACK_TITLE_CHARS);
        assert!(text.starts_with(&title));

        assert_eq!(fallback_title("  short   one "), "short one");
    }

    #[tokio::test]
    async fn test_title_from_completion() {
        let completer = MockCompleter::new();
        completer.queue_ok("Sofa Shopping");
        assert_eq!(title_for("I want a sofa", &completer).await, "Sofa Shopping");
    }

    #[tokio::test]
    async fn test_title_falls_back_on_error() {
        let completer = MockCompleter::new();
        completer.queue_err(CompletionError::NoConnectivity);
        assert_eq!(title_for("عايز كنبة", &completer).await, "عايز كنبة");
    }

    #[tokio::test]
    async fn test_title_falls_back_on_blank_output() {
        let completer = MockCompleter::new();
        completer.queue_ok("  \"\"  ");
        assert_eq!(title_for("hello there", &completer).await, "hello there");
    }
}
