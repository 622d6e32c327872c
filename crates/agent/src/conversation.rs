use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::intent::Intent;

/// Upper bound on retained exchanges per sender.
pub const MAX_HISTORY: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    Greeting,
    Active,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub message: String,
    pub response: String,
    pub intent: Intent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub sender_id: String,
    pub history: VecDeque<Exchange>,
    pub stage: ConversationStage,
}

impl ConversationState {
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            history: VecDeque::new(),
            stage: ConversationStage::Greeting,
        }
    }

    /// Appends and evicts from the front until at most `limit` entries remain.
    pub fn push(&mut self, exchange: Exchange, limit: usize) {
        self.history.push_back(exchange);
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    /// Up to `count` most recent exchanges, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &Exchange> {
        self.history.iter().skip(self.history.len().saturating_sub(count))
    }
}

#[derive(Debug, Error)]
pub enum ConversationStoreError {
    #[error("conversation backend failure: {0}")]
    Backend(String),
}

#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get_or_create(&self, sender_id: &str)
        -> Result<ConversationState, ConversationStoreError>;

    async fn append(
        &self,
        sender_id: &str,
        exchange: Exchange,
    ) -> Result<ConversationState, ConversationStoreError>;

    async fn set_stage(
        &self,
        sender_id: &str,
        stage: ConversationStage,
    ) -> Result<(), ConversationStoreError>;
}

/// Process-lifetime store with one lock per sender.
///
/// The outer map lock is only held to find or insert a sender's slot, so
/// independent conversations never wait on each other's updates.
pub struct InMemoryConversationStore {
    history_limit: usize,
    conversations: RwLock<HashMap<String, Arc<Mutex<ConversationState>>>>,
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

impl InMemoryConversationStore {
    /// `history_limit` is clamped into `1..=MAX_HISTORY`.
    pub fn new(history_limit: usize) -> Self {
        Self {
            history_limit: history_limit.clamp(1, MAX_HISTORY),
            conversations: RwLock::new(HashMap::new()),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub async fn sender_count(&self) -> usize {
        self.conversations.read().await.len()
    }

    async fn slot(&self, sender_id: &str) -> Arc<Mutex<ConversationState>> {
        if let Some(slot) = self.conversations.read().await.get(sender_id) {
            return Arc::clone(slot);
        }

        let mut conversations = self.conversations.write().await;
        let slot = conversations
            .entry(sender_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(ConversationState::new(sender_id))));
        Arc::clone(slot)
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_or_create(
        &self,
        sender_id: &str,
    ) -> Result<ConversationState, ConversationStoreError> {
        let slot = self.slot(sender_id).await;
        let state = slot.lock().await;
        Ok(state.clone())
    }

    async fn append(
        &self,
        sender_id: &str,
        exchange: Exchange,
    ) -> Result<ConversationState, ConversationStoreError> {
        let slot = self.slot(sender_id).await;
        let mut state = slot.lock().await;
        state.push(exchange, self.history_limit);
        Ok(state.clone())
    }

    async fn set_stage(
        &self,
        sender_id: &str,
        stage: ConversationStage,
    ) -> Result<(), ConversationStoreError> {
        let slot = self.slot(sender_id).await;
        slot.lock().await.stage = stage;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{
        ConversationStage, ConversationStore, Exchange, InMemoryConversationStore, MAX_HISTORY,
    };
    use crate::intent::Intent;

    fn exchange(index: usize) -> Exchange {
        Exchange {
            message: format!("message {index}"),
            response: format!("response {index}"),
            intent: Intent::GeneralInquiry,
        }
    }

    #[tokio::test]
    async fn new_senders_start_in_greeting_stage() {
        let store = InMemoryConversationStore::default();
        let state = store.get_or_create("+27820000001").await.expect("state");

        assert_eq!(state.sender_id, "+27820000001");
        assert_eq!(state.stage, ConversationStage::Greeting);
        assert!(state.history.is_empty());
        assert_eq!(store.sender_count().await, 1);
    }

    #[tokio::test]
    async fn history_is_bounded_and_evicts_oldest_first() {
        let store = InMemoryConversationStore::default();
        for index in 0..25 {
            let state = store.append("sender", exchange(index)).await.expect("append");
            assert!(state.history.len() <= MAX_HISTORY);
        }

        let state = store.get_or_create("sender").await.expect("state");
        assert_eq!(state.history.len(), MAX_HISTORY);
        assert_eq!(state.history.front().map(|entry| entry.message.as_str()), Some("message 15"));
        assert_eq!(state.history.back().map(|entry| entry.message.as_str()), Some("message 24"));
    }

    #[tokio::test]
    async fn configured_limit_is_clamped() {
        assert_eq!(InMemoryConversationStore::new(0).history_limit(), 1);
        assert_eq!(InMemoryConversationStore::new(50).history_limit(), MAX_HISTORY);

        let store = InMemoryConversationStore::new(3);
        for index in 0..5 {
            store.append("sender", exchange(index)).await.expect("append");
        }
        let state = store.get_or_create("sender").await.expect("state");
        assert_eq!(
            state.recent(10).map(|entry| entry.message.as_str()).collect::<Vec<_>>(),
            vec!["message 2", "message 3", "message 4"]
        );
    }

    #[tokio::test]
    async fn stage_updates_are_per_sender() {
        let store = InMemoryConversationStore::default();
        store.set_stage("a", ConversationStage::Active).await.expect("set stage");

        assert_eq!(store.get_or_create("a").await.expect("a").stage, ConversationStage::Active);
        assert_eq!(store.get_or_create("b").await.expect("b").stage, ConversationStage::Greeting);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_senders_keep_independent_histories() {
        let store = Arc::new(InMemoryConversationStore::default());
        let mut tasks = Vec::new();
        for sender in 0..8 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                let sender_id = format!("sender-{sender}");
                for index in 0..6 {
                    store.append(&sender_id, exchange(index)).await.expect("append");
                }
            }));
        }
        for task in tasks {
            task.await.expect("task completes");
        }

        assert_eq!(store.sender_count().await, 8);
        for sender in 0..8 {
            let state = store.get_or_create(&format!("sender-{sender}")).await.expect("state");
            assert_eq!(state.history.len(), 6);
            assert!(state.history.iter().enumerate().all(|(index, entry)| {
                entry.message == format!("message {index}")
            }));
        }
    }
}
