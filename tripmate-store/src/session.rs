//! Session registry: process-lifetime conversation state for the facade.
//!
//! Sessions are deliberately ephemeral; nothing here touches disk and a
//! restart forgets everything. The registry is a trait so request handlers
//! receive an injected store rather than reaching for a process global.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Conversation history plus the free-form state map the agent works
/// against (`user_profile`, `_time`, `user_id`, scratch keys).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub messages: Vec<ChatMessage>,
    pub state: Map<String, Value>,
}

/// Session registry seam: get/create, replace, delete, list.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Option<SessionData>;

    /// Return an existing session unchanged, or mint a fresh one.
    ///
    /// A caller-supplied id is trusted as-is; ownership is not checked
    /// against `user_id`. New ids are `{user_id}_{yyyyMMddHHmmss}`, so two
    /// creations for one user within a second overwrite silently.
    async fn get_or_create(&self, session_id: Option<&str>, user_id: &str)
        -> (SessionData, String);

    async fn put(&self, session_id: &str, data: SessionData);

    async fn delete(&self, session_id: &str) -> bool;

    async fn list(&self) -> Vec<String>;
}

/// In-process registry behind an RwLock; destroyed with the process.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionData>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<SessionData> {
        self.sessions.read().await.get(session_id).cloned()
    }

    async fn get_or_create(
        &self,
        session_id: Option<&str>,
        user_id: &str,
    ) -> (SessionData, String) {
        if let Some(id) = session_id {
            if let Some(existing) = self.sessions.read().await.get(id) {
                return (existing.clone(), id.to_string());
            }
        }

        let new_id = format!("{}_{}", user_id, Local::now().format("%Y%m%d%H%M%S"));
        let session = SessionData::default();
        self.sessions
            .write()
            .await
            .insert(new_id.clone(), session.clone());
        tracing::info!(session_id = %new_id, "created new session");
        (session, new_id)
    }

    async fn put(&self, session_id: &str, data: SessionData) {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), data);
    }

    async fn delete(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    async fn list(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }
}
