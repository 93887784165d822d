//! Two-pass search orchestrator (spec §4.6).
//!
//! Pass one streams every conversation once, applies the filter pipeline
//! ([`filters`]), and — for survivors — builds per-document token
//! statistics plus running corpus statistics. Pass two scores each
//! survivor with [`bm25`], sorts by the requested key, takes the top
//! `limit`, and fills in snippets ([`snippet`]) only for the conversations
//! actually returned.

pub mod bm25;
pub mod filters;
pub mod snippet;

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::Error;
use crate::model::{Conversation, SearchQuery, SearchResult, SortBy, SortOrder};
use crate::tokenizer::tokenize;

struct Candidate {
    conversation: Conversation,
    stats: bm25::DocStats,
}

/// Run `query` against every conversation yielded by `conversations`.
pub fn run(
    conversations: impl Iterator<Item = Conversation>,
    query: &SearchQuery,
) -> Result<Vec<SearchResult>, Error> {
    let query_terms: Vec<String> = query.keywords.iter().flat_map(|k| tokenize(k)).collect();

    let mut corpus = bm25::Corpus::new();
    let mut candidates = Vec::new();

    for conv in conversations {
        let Some(restricted) = filters::prefilter(&conv, query) else {
            continue;
        };

        let doc_text_lower: String = restricted
            .iter()
            .map(|m| m.content().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        let doc_tokens = tokenize(&doc_text_lower);
        let token_set: HashSet<&str> = doc_tokens.iter().map(String::as_str).collect();

        if !filters::passes_content(&doc_text_lower, &token_set, query) {
            continue;
        }

        let stats = bm25::DocStats::from_tokens(doc_tokens.iter().map(String::as_str));
        corpus.add_document(&stats);
        candidates.push(Candidate {
            conversation: conv,
            stats,
        });
    }

    tracing::debug!(
        candidates = candidates.len(),
        avg_doc_length = corpus.avg_doc_length(),
        "search pass 1 complete"
    );

    let mut scored: Vec<(Candidate, f64)> = candidates
        .into_iter()
        .map(|c| {
            let score = bm25::score(&c.stats, &query_terms, &corpus);
            (c, score)
        })
        .collect();

    scored.sort_by(|(a, a_score), (b, b_score)| compare(a, *a_score, b, *b_score, query));

    let mut needles: Vec<String> = query_terms.clone();
    needles.extend(query.phrases.iter().map(|p| p.to_lowercase()));

    let results = scored
        .into_iter()
        .take(query.limit as usize)
        .map(|(candidate, score)| {
            let restricted = filters::restrict_by_role(&candidate.conversation, query).unwrap_or_default();
            let (snippet, matched_message_ids) = snippet::extract(&restricted, &needles);
            SearchResult {
                conversation: candidate.conversation,
                score,
                matched_message_ids,
                snippet,
            }
        })
        .collect();

    tracing::debug!(returned = results.len(), limit = query.limit, "search pass 2 complete");

    Ok(results)
}

fn compare(a: &Candidate, a_score: f64, b: &Candidate, b_score: f64, query: &SearchQuery) -> Ordering {
    let primary = match query.sort_by {
        SortBy::Score => a_score.partial_cmp(&b_score).unwrap_or(Ordering::Equal),
        SortBy::Date => a
            .conversation
            .updated_at_or_created()
            .cmp(&b.conversation.updated_at_or_created()),
        SortBy::Title => a.conversation.title().cmp(b.conversation.title()),
        SortBy::Messages => a.conversation.messages().len().cmp(&b.conversation.messages().len()),
    };
    let ordered = match query.sort_order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    // Stable, deterministic tie-break: ascending conversation id.
    ordered.then_with(|| a.conversation.id().cmp(b.conversation.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Message, Role, SearchQueryBuilder};
    use chrono::Utc;
    use std::collections::HashMap;

    fn conv(id: &str, title: &str, content: &str) -> Conversation {
        let msg = Message::new(
            format!("{id}-m1"),
            content,
            Role::User,
            Utc::now(),
            None,
            Vec::new(),
            HashMap::new(),
        )
        .unwrap();
        Conversation::new(id, title, Utc::now(), None, vec![msg]).unwrap()
    }

    #[test]
    fn keyword_match_ranks_above_non_match() {
        let convs = vec![
            conv("c1", "about rust", "I love rust programming"),
            conv("c2", "about python", "I love python programming"),
        ];
        let query = SearchQueryBuilder::new()
            .keywords(vec!["rust".into()])
            .build()
            .unwrap();
        let results = run(convs.into_iter(), &query).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].conversation.id(), "c1");
    }

    #[test]
    fn no_keywords_returns_all_filtered_candidates() {
        let convs = vec![conv("c1", "t1", "hello"), conv("c2", "t2", "world")];
        let query = SearchQueryBuilder::new().build().unwrap();
        let results = run(convs.into_iter(), &query).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn limit_truncates_result_set() {
        let convs = vec![
            conv("c1", "t1", "rust rust rust"),
            conv("c2", "t2", "rust"),
            conv("c3", "t3", "rust rust"),
        ];
        let query = SearchQueryBuilder::new()
            .keywords(vec!["rust".into()])
            .limit(2)
            .build()
            .unwrap();
        let results = run(convs.into_iter(), &query).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn sort_by_title_ascending() {
        let convs = vec![conv("c1", "zeta", "hi"), conv("c2", "alpha", "hi")];
        let query = SearchQueryBuilder::new()
            .sort_by(SortBy::Title)
            .sort_order(SortOrder::Asc)
            .build()
            .unwrap();
        let results = run(convs.into_iter(), &query).unwrap();
        assert_eq!(results[0].conversation.title(), "alpha");
    }
}
