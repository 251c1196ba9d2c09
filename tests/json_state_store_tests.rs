//! Tests for the JSON file state store.

use chatdesk::{
    ChatState, ConversationRepository, JsonFileStateStore, Role, StateStore,
};

fn sample_state(conversations: usize) -> ChatState {
    let mut repository = ConversationRepository::new(100);
    for i in 0..conversations {
        let conversation = repository.create_conversation().unwrap();
        repository
            .append_message(conversation.id(), Role::User, format!("question {i}"))
            .unwrap();
    }
    repository.snapshot()
}

#[tokio::test]
async fn test_round_trip_preserves_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStateStore::new(dir.path(), 15);
    let state = sample_state(3);

    store.save(&state).await.unwrap();
    let loaded = store.load().await;

    assert_eq!(loaded, state);
}

#[tokio::test]
async fn test_corrupt_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("conversations.json"), "{ this is not json").unwrap();
    let store = JsonFileStateStore::new(dir.path(), 15);

    let loaded = store.load().await;

    assert!(loaded.is_empty());
    assert!(loaded.active_conversation_id.is_none());
}

#[tokio::test]
async fn test_save_truncates_to_limit() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStateStore::new(dir.path(), 2);
    let state = sample_state(4);
    let newest: Vec<String> = state.conversations[2..]
        .iter()
        .map(|c| c.id().to_string())
        .collect();

    store.save(&state).await.unwrap();
    let loaded = store.load().await;

    let ids: Vec<String> = loaded.conversations.iter().map(|c| c.id().to_string()).collect();
    assert_eq!(ids, newest);
    assert_eq!(loaded.active_conversation_id.as_deref(), Some(newest[1].as_str()));
}

#[tokio::test]
async fn test_dangling_active_id_is_repaired_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStateStore::new(dir.path(), 15);
    let mut state = sample_state(2);
    let newest = state.conversations[1].id().to_string();
    state.active_conversation_id = Some("chat_gone".to_string());

    store.save(&state).await.unwrap();
    let loaded = store.load().await;

    assert_eq!(loaded.active_conversation_id.as_deref(), Some(newest.as_str()));
}

#[tokio::test]
async fn test_legacy_record_without_optional_fields_loads() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("conversations.json"),
        r#"{
            "conversations": [{
                "id": "chat_1700000000000_abc123def",
                "title": "Old chat",
                "messages": [{"role": "user", "content": "hi", "timestamp": 1700000000000}],
                "createdAt": 1700000000000,
                "updatedAt": 1700000000000
            }],
            "activeConversationId": "chat_1700000000000_abc123def"
        }"#,
    )
    .unwrap();
    let store = JsonFileStateStore::new(dir.path(), 15);

    let loaded = store.load().await;

    assert_eq!(loaded.len(), 1);
    let conversation = &loaded.conversations[0];
    assert_eq!(conversation.title(), "Old chat");
    assert_eq!(conversation.messages()[0].content(), "hi");
    assert!(!conversation.messages()[0].id().is_empty());
}

#[tokio::test]
async fn test_save_replaces_previous_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStateStore::new(dir.path(), 15);

    store.save(&sample_state(3)).await.unwrap();
    store.save(&sample_state(1)).await.unwrap();

    assert_eq!(store.load().await.len(), 1);
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
