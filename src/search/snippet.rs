//! Snippet extraction (spec §4.7).
//!
//! A snippet is a ~100-character window around the first keyword or phrase
//! hit, widened by up to ~20 characters of leading context and trimmed to
//! word boundaries. Leading/trailing ellipses mark truncation. When the
//! matched text spans more than one message, the snippet is suffixed with
//! `(+N more)`, where `N` counts *matched messages*, not keyword hits.

use crate::model::Message;

const WINDOW: usize = 100;
const LEADING_CONTEXT: usize = 20;

const CONTENT_UNAVAILABLE: &str = "[Content unavailable]";
const NO_CONTENT_MATCHED: &str = "[No content matched]";

/// Build the snippet and matched-message-id list for one search result.
/// `messages` is the role-restricted message set the filters matched
/// against; `needles` are the lowercased keywords and phrases that drove
/// the search (empty for a pure filter query, with no text terms).
pub fn extract(messages: &[&Message], needles: &[String]) -> (String, Vec<String>) {
    if messages.is_empty() {
        return (CONTENT_UNAVAILABLE.to_string(), Vec::new());
    }

    if needles.is_empty() {
        let snippet = truncate_with_ellipsis(messages[0].content(), WINDOW);
        return (snippet, Vec::new());
    }

    let mut matched_ids = Vec::new();
    let mut first_hit: Option<(&str, usize)> = None;

    for message in messages {
        let lower = message.content().to_lowercase();
        let mut matched_this_message = false;
        for needle in needles {
            if needle.is_empty() {
                continue;
            }
            if let Some(pos) = lower.find(needle.as_str()) {
                matched_this_message = true;
                if first_hit.is_none() {
                    first_hit = Some((message.content(), pos));
                }
            }
        }
        if matched_this_message {
            matched_ids.push(message.id().to_string());
        }
    }

    let Some((text, pos)) = first_hit else {
        return (NO_CONTENT_MATCHED.to_string(), Vec::new());
    };

    let mut snippet = window_around(text, pos);
    if matched_ids.len() > 1 {
        snippet.push_str(&format!(" (+{} more)", matched_ids.len() - 1));
    }

    (snippet, matched_ids)
}

fn truncate_with_ellipsis(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let truncated = trim_to_word_boundary(text, max_len);
    format!("{truncated}...")
}

/// Extract a `~WINDOW`-character window around byte offset `pos`, with up
/// to `LEADING_CONTEXT` characters of context before the match, trimmed to
/// word boundaries and marked with ellipses where truncated.
fn window_around(text: &str, pos: usize) -> String {
    let char_indices: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let match_char_idx = char_indices.iter().position(|&i| i >= pos).unwrap_or(0);

    let start_char = match_char_idx.saturating_sub(LEADING_CONTEXT);
    let end_char = (start_char + WINDOW).min(text.chars().count());

    let start_byte = char_indices.get(start_char).copied().unwrap_or(0);
    let end_byte = char_indices.get(end_char).copied().unwrap_or(text.len());

    let mut window = text[start_byte..end_byte].to_string();
    window = trim_to_word_boundary(&window, window.chars().count());

    let leading_ellipsis = start_char > 0;
    let trailing_ellipsis = end_char < text.chars().count();

    if leading_ellipsis {
        window = format!("...{window}");
    }
    if trailing_ellipsis {
        window.push_str("...");
    }
    window
}

/// Trim `text` to at most `max_len` characters without splitting a word.
fn trim_to_word_boundary(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.trim().to_string();
    }
    let truncated: String = text.chars().take(max_len).collect();
    match truncated.rfind(char::is_whitespace) {
        Some(idx) => truncated[..idx].trim_end().to_string(),
        None => truncated,
    }
}
