use chrono::Utc;
use rand::Rng;
use tracing::debug;

use crate::domain::{
    ChatState, Conversation, ConversationSummary, DomainError, Message, Role,
};

const ID_SUFFIX_LEN: usize = 9;
const ID_ATTEMPTS: usize = 16;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// In-memory collection of conversations plus the active selection.
///
/// Conversations are kept in creation order; that order decides which
/// neighbour becomes active after a deletion. Every timestamp handed out is
/// strictly greater than the previous one, so recency ordering never ties
/// for conversations touched by the same process.
#[derive(Debug)]
pub struct ConversationRepository {
    state: ChatState,
    max_chats: usize,
    last_stamp: i64,
}

impl ConversationRepository {
    pub fn new(max_chats: usize) -> Self {
        Self::from_state(ChatState::default(), max_chats)
    }

    /// Restores a loaded state. Dangling active ids are repaired; the
    /// retention limit is not applied until [`Self::enforce_retention`].
    pub fn from_state(mut state: ChatState, max_chats: usize) -> Self {
        state.repair_active();
        let last_stamp = state
            .conversations
            .iter()
            .map(|c| c.updated_at().max(c.created_at()))
            .max()
            .unwrap_or(0);

        Self {
            state,
            max_chats: max_chats.max(1),
            last_stamp,
        }
    }

    pub fn snapshot(&self) -> ChatState {
        self.state.clone()
    }

    pub fn max_chats(&self) -> usize {
        self.max_chats
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.state.conversations.iter().find(|c| c.id() == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.state.active_conversation_id.as_deref()
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id().and_then(|id| self.get(id))
    }

    /// Conversations in creation order.
    pub fn conversations(&self) -> &[Conversation] {
        &self.state.conversations
    }

    pub fn create_conversation(&mut self) -> Result<Conversation, DomainError> {
        let now = self.tick();
        let id = self.generate_id(now)?;
        let conversation = Conversation::new(id.clone(), now);

        self.state.conversations.push(conversation.clone());
        self.state.active_conversation_id = Some(id);
        debug!("Created conversation {}", conversation.id());

        Ok(conversation)
    }

    pub fn delete_conversation(&mut self, id: &str) -> Result<Conversation, DomainError> {
        let index = self
            .position(id)
            .ok_or_else(|| DomainError::not_found(format!("Conversation not found: {}", id)))?;

        if self.state.len() <= 1 {
            return Err(DomainError::LastConversation);
        }

        let removed = self.state.conversations.remove(index);

        if self.active_id() == Some(id) {
            let next = index.min(self.state.len() - 1);
            self.state.active_conversation_id = Some(self.state.conversations[next].id().to_string());
        }

        debug!("Deleted conversation {}", id);
        Ok(removed)
    }

    pub fn append_message(
        &mut self,
        conversation_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> Result<Message, DomainError> {
        let content = content.into();
        self.push(conversation_id, |ts| Message::new(role, content, ts))
    }

    /// Appends an assistant message describing a failed request.
    pub fn append_error_message(
        &mut self,
        conversation_id: &str,
        content: impl Into<String>,
    ) -> Result<Message, DomainError> {
        let content = content.into();
        self.push(conversation_id, |ts| Message::error_notice(content, ts))
    }

    /// Returns `Ok(false)` when the clamped title is unchanged.
    pub fn rename_conversation(&mut self, id: &str, title: &str) -> Result<bool, DomainError> {
        let now = self.tick();
        let conversation = self.get_mut(id)?;
        Ok(conversation.rename(title, now))
    }

    pub fn select(&mut self, id: &str) -> Result<(), DomainError> {
        if self.position(id).is_none() {
            return Err(DomainError::not_found(format!("Conversation not found: {}", id)));
        }
        self.state.active_conversation_id = Some(id.to_string());
        Ok(())
    }

    /// Most recently updated first; equal timestamps ordered by id.
    pub fn list_by_recency(&self) -> Vec<&Conversation> {
        let mut sorted: Vec<&Conversation> = self.state.conversations.iter().collect();
        sorted.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        sorted
    }

    pub fn summaries(&self, now: i64) -> Vec<ConversationSummary> {
        let active = self.active_id();
        self.list_by_recency()
            .into_iter()
            .map(|c| c.summary(now, Some(c.id()) == active))
            .collect()
    }

    /// Evicts the least recently updated conversations beyond the limit and
    /// returns how many were dropped.
    pub fn enforce_retention(&mut self) -> usize {
        let evicted = self.state.truncate_to(self.max_chats);
        if evicted > 0 {
            debug!("Evicted {} conversations over the limit of {}", evicted, self.max_chats);
        }
        evicted
    }

    fn push(
        &mut self,
        conversation_id: &str,
        build: impl FnOnce(i64) -> Message,
    ) -> Result<Message, DomainError> {
        let now = self.tick();
        let conversation = self.get_mut(conversation_id)?;
        let message = build(now);
        conversation.push(message.clone());
        Ok(message)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Conversation, DomainError> {
        self.state
            .conversations
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| DomainError::not_found(format!("Conversation not found: {}", id)))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.state.conversations.iter().position(|c| c.id() == id)
    }

    fn tick(&mut self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last_stamp = now.max(self.last_stamp + 1);
        self.last_stamp
    }

    fn generate_id(&self, now: i64) -> Result<String, DomainError> {
        let mut rng = rand::thread_rng();
        for _ in 0..ID_ATTEMPTS {
            let suffix: String = (0..ID_SUFFIX_LEN)
                .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
                .collect();
            let id = format!("chat_{}_{}", now, suffix);
            if self.position(&id).is_none() {
                return Ok(id);
            }
        }
        Err(DomainError::internal("Could not generate a unique conversation id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_with(count: usize, max_chats: usize) -> (ConversationRepository, Vec<String>) {
        let mut repo = ConversationRepository::new(max_chats);
        let ids = (0..count)
            .map(|_| repo.create_conversation().unwrap().id().to_string())
            .collect();
        (repo, ids)
    }

    #[test]
    fn test_create_sets_active_with_defaults() {
        let mut repo = ConversationRepository::new(15);
        let conv = repo.create_conversation().unwrap();

        assert_eq!(repo.active_id(), Some(conv.id()));
        assert_eq!(conv.title(), crate::domain::DEFAULT_TITLE);
        assert!(conv.is_empty());
        assert!(conv.id().starts_with("chat_"));
    }

    #[test]
    fn test_ids_are_unique() {
        let (_, ids) = repo_with(50, 100);
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_append_preserves_order() {
        let (mut repo, ids) = repo_with(1, 15);
        let contents = ["one", "two", "three", "four"];
        for (i, text) in contents.iter().enumerate() {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            repo.append_message(&ids[0], role, *text).unwrap();
        }

        let conv = repo.get(&ids[0]).unwrap();
        let stored: Vec<_> = conv.messages().iter().map(|m| m.content()).collect();
        assert_eq!(stored, contents);
        assert_eq!(conv.title(), "one");
    }

    #[test]
    fn test_append_to_stale_id_fails() {
        let (mut repo, _) = repo_with(1, 15);
        let err = repo.append_message("chat_gone", Role::User, "hi").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_append_bumps_updated_at() {
        let (mut repo, ids) = repo_with(2, 15);
        repo.append_message(&ids[0], Role::User, "bump").unwrap();

        let order: Vec<_> = repo.list_by_recency().iter().map(|c| c.id().to_string()).collect();
        assert_eq!(order, vec![ids[0].clone(), ids[1].clone()]);
    }

    #[test]
    fn test_delete_last_conversation_is_refused() {
        let (mut repo, ids) = repo_with(1, 15);

        assert!(matches!(
            repo.delete_conversation(&ids[0]),
            Err(DomainError::LastConversation)
        ));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_delete_active_selects_same_index() {
        let (mut repo, ids) = repo_with(3, 15);
        repo.select(&ids[1]).unwrap();

        repo.delete_conversation(&ids[1]).unwrap();

        assert_eq!(repo.active_id(), Some(ids[2].as_str()));
    }

    #[test]
    fn test_delete_active_tail_clamps_to_last() {
        let (mut repo, ids) = repo_with(3, 15);
        assert_eq!(repo.active_id(), Some(ids[2].as_str()));

        repo.delete_conversation(&ids[2]).unwrap();

        assert_eq!(repo.active_id(), Some(ids[1].as_str()));
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let (mut repo, ids) = repo_with(3, 15);
        repo.delete_conversation(&ids[0]).unwrap();
        assert_eq!(repo.active_id(), Some(ids[2].as_str()));
    }

    #[test]
    fn test_rename_unchanged_is_noop() {
        let (mut repo, ids) = repo_with(1, 15);
        assert!(repo.rename_conversation(&ids[0], "Maths").unwrap());
        assert!(!repo.rename_conversation(&ids[0], "Maths").unwrap());
        assert!(repo.rename_conversation("missing", "x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_select_unknown_fails() {
        let (mut repo, ids) = repo_with(2, 15);
        assert!(repo.select("nope").unwrap_err().is_not_found());
        assert_eq!(repo.active_id(), Some(ids[1].as_str()));
    }

    #[test]
    fn test_retention_evicts_first_created() {
        let (mut repo, ids) = repo_with(16, 15);

        assert_eq!(repo.enforce_retention(), 1);
        assert_eq!(repo.len(), 15);
        assert!(repo.get(&ids[0]).is_none());
        assert!(repo.get(&ids[15]).is_some());
        assert_eq!(repo.active_id(), Some(ids[15].as_str()));
    }

    #[test]
    fn test_retention_keeps_recently_used_old_conversation() {
        let (mut repo, ids) = repo_with(3, 2);
        repo.append_message(&ids[0], Role::User, "still here").unwrap();

        repo.enforce_retention();

        assert!(repo.get(&ids[0]).is_some());
        assert!(repo.get(&ids[1]).is_none());
    }

    #[test]
    fn test_restored_state_continues_monotonic_stamps() {
        let (repo, ids) = repo_with(2, 15);
        let mut restored = ConversationRepository::from_state(repo.snapshot(), 15);

        let created = restored.create_conversation().unwrap();

        let newest = restored.list_by_recency()[0].id().to_string();
        assert_eq!(newest, created.id());
        assert_eq!(restored.len(), 3);
        assert!(restored.get(&ids[0]).is_some());
    }
}
