use serde::{Deserialize, Serialize};

use super::Conversation;

/// The persisted record: every conversation plus the active selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    #[serde(default)]
    pub active_conversation_id: Option<String>,
}

impl ChatState {
    pub fn new(conversations: Vec<Conversation>, active_conversation_id: Option<String>) -> Self {
        Self {
            conversations,
            active_conversation_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.conversations.iter().any(|c| c.id() == id)
    }

    /// Drops the least recently updated conversations until at most `max`
    /// remain, keeping the survivors in their original order. Returns the
    /// number evicted.
    pub fn truncate_to(&mut self, max: usize) -> usize {
        let excess = self.conversations.len().saturating_sub(max);
        if excess == 0 {
            return 0;
        }

        // Positions, not ids: loaded data may repeat an id.
        let mut by_age: Vec<(i64, usize)> = self
            .conversations
            .iter()
            .enumerate()
            .map(|(index, c)| (c.updated_at(), index))
            .collect();
        by_age.sort();
        let evicted: Vec<usize> = by_age.into_iter().take(excess).map(|(_, index)| index).collect();

        let mut position = 0;
        self.conversations.retain(|_| {
            let keep = !evicted.contains(&position);
            position += 1;
            keep
        });
        self.repair_active();
        excess
    }

    /// Points the active id at an existing conversation (the most recent one)
    /// when it is dangling, and clears it when there is nothing to point at.
    pub fn repair_active(&mut self) {
        let valid = self
            .active_conversation_id
            .as_deref()
            .is_some_and(|id| self.contains(id));
        if !valid {
            self.active_conversation_id = self.most_recent().map(|c| c.id().to_string());
        }
    }

    pub fn most_recent(&self) -> Option<&Conversation> {
        self.conversations
            .iter()
            .max_by(|a, b| a.updated_at().cmp(&b.updated_at()).then_with(|| a.id().cmp(b.id())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(stamps: &[(&str, i64)], active: Option<&str>) -> ChatState {
        let conversations = stamps
            .iter()
            .map(|(id, ts)| Conversation::new(*id, *ts))
            .collect();
        ChatState::new(conversations, active.map(String::from))
    }

    #[test]
    fn test_truncate_evicts_oldest_by_update() {
        let mut state = state_with(&[("b", 20), ("a", 10), ("c", 30)], Some("c"));

        let evicted = state.truncate_to(2);

        assert_eq!(evicted, 1);
        let ids: Vec<_> = state.conversations.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(state.active_conversation_id.as_deref(), Some("c"));
    }

    #[test]
    fn test_truncate_repairs_evicted_active() {
        let mut state = state_with(&[("a", 10), ("b", 20), ("c", 30)], Some("a"));

        state.truncate_to(2);

        assert_eq!(state.active_conversation_id.as_deref(), Some("c"));
    }

    #[test]
    fn test_truncate_with_repeated_ids_removes_one_entry() {
        let mut state = state_with(&[("a", 1), ("a", 5), ("b", 9)], Some("b"));

        let evicted = state.truncate_to(2);

        assert_eq!(evicted, 1);
        assert_eq!(state.len(), 2);
        let stamps: Vec<_> = state.conversations.iter().map(|c| c.updated_at()).collect();
        assert_eq!(stamps, vec![5, 9]);
    }

    #[test]
    fn test_truncate_within_limit_is_noop() {
        let mut state = state_with(&[("a", 10)], Some("a"));
        assert_eq!(state.truncate_to(15), 0);
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_repair_clears_active_when_empty() {
        let mut state = ChatState::new(Vec::new(), Some("gone".to_string()));
        state.repair_active();
        assert!(state.active_conversation_id.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{
            "conversations": [{"id": "a", "title": "T", "pinned": true}],
            "activeConversationId": "a",
            "schemaVersion": 7
        }"#;
        let state: ChatState = serde_json::from_str(json).unwrap();

        assert_eq!(state.len(), 1);
        assert_eq!(state.conversations[0].title(), "T");
        assert!(state.conversations[0].is_empty());
        assert_eq!(state.active_conversation_id.as_deref(), Some("a"));
    }
}
