//! Streaming adapter integration tests (spec §4.4, §8).


use echomine::provider::{Adapter, ProviderKind};

#[test]
fn detects_and_streams_openai_export() {
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "First", 1_700_000_000.0, "hi", "hello"),
        fixtures::openai_conversation("c2", "Second", 1_700_000_100.0, "yo", "hey"),
    ]);

    let adapter = Adapter::detect(export.path()).unwrap();
    assert_eq!(adapter.provider(), ProviderKind::OpenAi);

    let conversations: Vec<_> = adapter
        .stream_conversations(export.path(), None, None)
        .unwrap()
        .collect();
    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0].id(), "c1");
    assert_eq!(conversations[1].id(), "c2");
}

#[test]
fn detects_and_streams_claude_export() {
    let export = fixtures::claude_export(&[fixtures::claude_conversation(
        "c1",
        "Hi",
        "2024-01-01T00:00:00Z",
        "hello",
        "hi there",
    )]);

    let adapter = Adapter::detect(export.path()).unwrap();
    assert_eq!(adapter.provider(), ProviderKind::Claude);

    let conversations: Vec<_> = adapter
        .stream_conversations(export.path(), None, None)
        .unwrap()
        .collect();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].messages().len(), 2);
}

#[test]
fn invalid_record_is_skipped_not_fatal() {
    // Second record is missing `current_node`, which fails OpenAI
    // normalization; it should be skipped, not abort the whole stream.
    let good = fixtures::openai_conversation("c1", "Good", 1_700_000_000.0, "hi", "hello");
    let bad = r#"{"id":"c2","title":"Bad","create_time":1700000001.0,"mapping":{}}"#.to_string();
    let export = fixtures::openai_export(&[good, bad]);

    let adapter = Adapter::detect(export.path()).unwrap();
    let mut skip_count = 0;
    let conversations: Vec<_> = adapter
        .stream_conversations(export.path(), Some(Box::new(|_| skip_count += 1)), None)
        .unwrap()
        .collect();

    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].id(), "c1");
    assert_eq!(skip_count, 1);
}

#[test]
fn get_conversation_by_id_finds_match() {
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "First", 1_700_000_000.0, "hi", "hello"),
        fixtures::openai_conversation("c2", "Second", 1_700_000_100.0, "yo", "hey"),
    ]);
    let adapter = Adapter::detect(export.path()).unwrap();

    let found = adapter.get_conversation_by_id(export.path(), "c2").unwrap();
    assert!(found.is_some());
    assert_eq!(found.unwrap().title(), "Second");

    let missing = adapter.get_conversation_by_id(export.path(), "nope").unwrap();
    assert!(missing.is_none());
}

#[test]
fn get_message_by_id_returns_owning_conversation() {
    let export = fixtures::openai_export(&[fixtures::openai_conversation(
        "c1",
        "First",
        1_700_000_000.0,
        "hi",
        "hello",
    )]);
    let adapter = Adapter::detect(export.path()).unwrap();

    let (message, conversation) = adapter
        .get_message_by_id(export.path(), "c1-m2", None)
        .unwrap()
        .expect("message found");
    assert_eq!(message.content(), "hello");
    assert_eq!(conversation.id(), "c1");
}

#[test]
fn empty_array_yields_zero_conversations() {
    let export = fixtures::write_export("[]");
    let adapter = Adapter::detect(export.path()).unwrap();
    assert_eq!(adapter.provider(), ProviderKind::OpenAi);

    let conversations: Vec<_> = adapter
        .stream_conversations(export.path(), None, None)
        .unwrap()
        .collect();
    assert!(conversations.is_empty());
}

#[test]
fn repeated_streams_over_same_file_are_idempotent() {
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "First", 1_700_000_000.0, "hi", "hello"),
        fixtures::openai_conversation("c2", "Second", 1_700_000_100.0, "yo", "hey"),
    ]);
    let adapter = Adapter::detect(export.path()).unwrap();

    let first: Vec<_> = adapter
        .stream_conversations(export.path(), None, None)
        .unwrap()
        .map(|c| c.id().to_string())
        .collect();
    let second: Vec<_> = adapter
        .stream_conversations(export.path(), None, None)
        .unwrap()
        .map(|c| c.id().to_string())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn concurrent_streams_do_not_interfere() {
    let export = fixtures::openai_export(&[
        fixtures::openai_conversation("c1", "First", 1_700_000_000.0, "hi", "hello"),
        fixtures::openai_conversation("c2", "Second", 1_700_000_100.0, "yo", "hey"),
        fixtures::openai_conversation("c3", "Third", 1_700_000_200.0, "sup", "hiya"),
    ]);
    let path = export.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let path = path.clone();
            std::thread::spawn(move || {
                let adapter = Adapter::detect(&path).unwrap();
                adapter
                    .stream_conversations(&path, None, None)
                    .unwrap()
                    .map(|c| c.id().to_string())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results {
        assert_eq!(result, &vec!["c1".to_string(), "c2".to_string(), "c3".to_string()]);
    }
}
