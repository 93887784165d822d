//! End-to-end search scenarios over real exports (spec §4.5-§4.7, §8).


use chrono::NaiveDate;
use echomine::model::{MatchMode, Role, SearchQueryBuilder, SortBy, SortOrder};
use echomine::provider::Adapter;

#[test]
fn keyword_search_is_case_insensitive() {
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "Chat", 1_700_000_000.0, "Tell me about RUST", "Rust is great"),
        fixtures::openai_conversation("c2", "Chat", 1_700_000_100.0, "Tell me about python", "Python is nice"),
    ]);
    let adapter = Adapter::detect(export.path()).unwrap();
    let query = SearchQueryBuilder::new().keywords(vec!["rust".into()]).build().unwrap();

    let results = adapter.search(export.path(), &query).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].conversation.id(), "c1");
}

#[test]
fn match_mode_all_requires_every_keyword_present() {
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "Chat", 1_700_000_000.0, "rust and search engines", "indeed"),
        fixtures::openai_conversation("c2", "Chat", 1_700_000_100.0, "rust programming", "indeed"),
    ]);
    let adapter = Adapter::detect(export.path()).unwrap();
    let query = SearchQueryBuilder::new()
        .keywords(vec!["rust".into(), "search".into()])
        .match_mode(MatchMode::All)
        .build()
        .unwrap();

    let results = adapter.search(export.path(), &query).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].conversation.id(), "c1");
}

#[test]
fn exclude_keyword_removes_matching_candidate() {
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "Chat", 1_700_000_000.0, "rust is fast", "yes"),
        fixtures::openai_conversation("c2", "Chat", 1_700_000_100.0, "rust is slow sometimes", "yes"),
    ]);
    let adapter = Adapter::detect(export.path()).unwrap();
    let query = SearchQueryBuilder::new()
        .keywords(vec!["rust".into()])
        .exclude_keywords(vec!["slow".into()])
        .build()
        .unwrap();

    let results = adapter.search(export.path(), &query).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].conversation.id(), "c1");
}

#[test]
fn date_range_boundaries_are_inclusive() {
    // 2024-02-29 is a leap day; include it, exclude 2024-12-31.
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "Leap", 1_709_208_000.0, "hi", "hey"), // 2024-02-29
        fixtures::openai_conversation("c2", "YearEnd", 1_735_603_200.0, "hi", "hey"), // 2024-12-31
    ]);
    let adapter = Adapter::detect(export.path()).unwrap();
    let query = SearchQueryBuilder::new()
        .from_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .to_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        .build()
        .unwrap();

    let results = adapter.search(export.path(), &query).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].conversation.id(), "c1");
}

#[test]
fn snippet_overflow_starts_at_first_word_and_ends_with_ellipsis() {
    let long_text = format!("word match here: {}", "filler ".repeat(40));
    let export = fixtures::openai_export(&[fixtures::openai_conversation(
        "c1",
        "Chat",
        1_700_000_000.0,
        &long_text,
        "ok",
    )]);
    let adapter = Adapter::detect(export.path()).unwrap();
    let query = SearchQueryBuilder::new().keywords(vec!["match".into()]).build().unwrap();

    let results = adapter.search(export.path(), &query).unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].snippet.contains("match"));
    assert!(results[0].snippet.ends_with("..."));
}

#[test]
fn phrase_matches_literal_hyphenated_text_not_its_parts() {
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "Chat", 1_700_000_000.0, "this is a well-known fact", "ok"),
        fixtures::openai_conversation("c2", "Chat", 1_700_000_100.0, "this is a wellknown fact", "ok"),
    ]);
    let adapter = Adapter::detect(export.path()).unwrap();
    let query = SearchQueryBuilder::new()
        .phrases(vec!["well-known".into()])
        .build()
        .unwrap();

    let results = adapter.search(export.path(), &query).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].conversation.id(), "c1");
}

#[test]
fn role_filter_restricts_corpus_to_matching_messages() {
    let export = fixtures::openai_export(&[fixtures::openai_conversation(
        "c1",
        "Chat",
        1_700_000_000.0,
        "mentions rust",
        "no mention of the language",
    )]);
    let adapter = Adapter::detect(export.path()).unwrap();

    // Keyword only appears in the user message; restricting to assistant
    // should exclude this conversation from a keyword search.
    let query = SearchQueryBuilder::new()
        .role_filter(Role::Assistant)
        .keywords(vec!["rust".into()])
        .build()
        .unwrap();
    let results = adapter.search(export.path(), &query).unwrap();
    assert!(results.is_empty());

    let query = SearchQueryBuilder::new().role_filter(Role::User).keywords(vec!["rust".into()]).build().unwrap();
    let results = adapter.search(export.path(), &query).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn sort_by_date_descending_orders_newest_first() {
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "Older", 1_700_000_000.0, "hi", "hey"),
        fixtures::openai_conversation("c2", "Newer", 1_700_100_000.0, "hi", "hey"),
    ]);
    let adapter = Adapter::detect(export.path()).unwrap();
    let query = SearchQueryBuilder::new()
        .sort_by(SortBy::Date)
        .sort_order(SortOrder::Desc)
        .build()
        .unwrap();

    let results = adapter.search(export.path(), &query).unwrap();
    assert_eq!(results[0].conversation.id(), "c2");
    assert_eq!(results[1].conversation.id(), "c1");
}

#[test]
fn title_filter_on_empty_corpus_returns_no_results() {
    let export = fixtures::write_export("[]");
    let adapter = Adapter::detect(export.path()).unwrap();
    let query = SearchQueryBuilder::new().keywords(vec!["anything".into()]).build().unwrap();
    let results = adapter.search(export.path(), &query).unwrap();
    assert!(results.is_empty());
}
