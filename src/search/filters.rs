//! Candidate filtering pipeline (spec §4.5).
//!
//! Filters apply in a fixed order — date, title, message count, role,
//! phrase, exclude, match mode — short-circuiting on the first rejection so
//! cheap checks reject candidates before the tokenized ones run. The role
//! filter is special: rather than a yes/no predicate, it *restricts* which
//! messages contribute to the document text every later filter and the
//! BM25 scorer see (spec §4.5 "Corpus and aggregation").

use std::collections::HashSet;

use crate::model::{Conversation, MatchMode, Message, SearchQuery};
use crate::tokenizer::tokenize;

/// Tokenize every term and flatten the results, so a multi-word, hyphenated,
/// or CJK term contributes each of its own tokens individually (spec §4.5
/// step 6).
fn flatten_tokens(terms: &[String]) -> Vec<String> {
    terms.iter().flat_map(|term| tokenize(term)).collect()
}

fn passes_date(conv: &Conversation, query: &SearchQuery) -> bool {
    let date = conv.updated_at_or_created().date_naive();
    if let Some(from) = query.from_date
        && date < from
    {
        return false;
    }
    if let Some(to) = query.to_date
        && date > to
    {
        return false;
    }
    true
}

fn passes_title(conv: &Conversation, query: &SearchQuery) -> bool {
    match &query.title_filter {
        Some(needle) => conv.title().to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

fn passes_message_count(conv: &Conversation, query: &SearchQuery) -> bool {
    let count = conv.messages().len() as u32;
    if let Some(min) = query.min_messages
        && count < min
    {
        return false;
    }
    if let Some(max) = query.max_messages
        && count > max
    {
        return false;
    }
    true
}

fn passes_phrase(doc_text_lower: &str, query: &SearchQuery) -> bool {
    query
        .phrases
        .iter()
        .all(|phrase| doc_text_lower.contains(&phrase.to_lowercase()))
}

fn passes_exclude(tokens: &HashSet<&str>, query: &SearchQuery) -> bool {
    let excluded = flatten_tokens(&query.exclude_keywords);
    !excluded.iter().any(|token| tokens.contains(token.as_str()))
}

fn passes_match_mode(tokens: &HashSet<&str>, query: &SearchQuery) -> bool {
    if query.keywords.is_empty() {
        return true;
    }
    let terms = flatten_tokens(&query.keywords);
    match query.match_mode {
        MatchMode::Any => terms.iter().any(|token| tokens.contains(token.as_str())),
        MatchMode::All => terms.iter().all(|token| tokens.contains(token.as_str())),
    }
}

/// Restrict `conv`'s messages to `role_filter`, if set. Returns `None` when
/// the restriction empties the set while a content-level filter (keywords
/// or phrases) is in play, which the spec treats as an outright rejection
/// rather than an empty-but-passing document.
pub(crate) fn restrict_by_role<'a>(conv: &'a Conversation, query: &SearchQuery) -> Option<Vec<&'a Message>> {
    let restricted: Vec<&Message> = match query.role_filter {
        Some(role) => conv.messages().iter().filter(|m| m.role() == role).collect(),
        None => conv.messages().iter().collect(),
    };
    let has_content_filter = !query.keywords.is_empty() || !query.phrases.is_empty();
    if query.role_filter.is_some() && restricted.is_empty() && has_content_filter {
        None
    } else {
        Some(restricted)
    }
}

/// Apply date/title/message-count/role filters, returning the role-
/// restricted message set on success (spec order, steps 1-4). `None` means
/// reject outright.
pub fn prefilter<'a>(conv: &'a Conversation, query: &SearchQuery) -> Option<Vec<&'a Message>> {
    if !passes_date(conv, query) || !passes_title(conv, query) || !passes_message_count(conv, query) {
        return None;
    }
    restrict_by_role(conv, query)
}

/// Apply the remaining content-level filters (phrase, exclude, match-mode;
/// spec order steps 5-7) against the role-restricted document text.
pub fn passes_content(doc_text_lower: &str, tokens: &HashSet<&str>, query: &SearchQuery) -> bool {
    passes_phrase(doc_text_lower, query) && passes_exclude(tokens, query) && passes_match_mode(tokens, query)
}
