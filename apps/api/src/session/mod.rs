//! Session-scoped persistence of the conversation and its rendered transcript.
//!
//! Only meant to survive UI remounts and page reloads, not to be a durable record.
//! `AppState` carries an `Arc<dyn SessionStore>`: redis in deployments, in-memory
//! for local runs and tests.

pub mod memory_store;
pub mod redis_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::assistant::conversation::{ConversationState, Speaker};
use crate::assistant::models::ParsedResponse;
use crate::assistant::orchestrator::TurnOutcome;

pub use memory_store::InMemorySessionStore;
pub use redis_store::RedisSessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt session record: {0}")]
    Corrupt(String),
}

/// One rendered chat bubble. User entries only carry text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    #[serde(flatten)]
    pub message: ParsedResponse,
    #[serde(default)]
    pub fallback: bool,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub state: ConversationState,
    pub transcript: Vec<TranscriptEntry>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Next record after a completed turn. The conversation state is taken from the outcome.
    pub fn apply_turn(&self, utterance: &str, outcome: &TurnOutcome) -> SessionRecord {
        let now = Utc::now();
        let mut transcript = self.transcript.clone();
        transcript.push(TranscriptEntry {
            speaker: Speaker::User,
            message: ParsedResponse::text_only(utterance.trim()),
            fallback: false,
            at: now,
        });
        transcript.push(TranscriptEntry {
            speaker: Speaker::Assistant,
            message: outcome.response.clone(),
            fallback: outcome.failure.is_some(),
            at: now,
        });

        SessionRecord {
            state: outcome.state.clone(),
            transcript,
            updated_at: Some(now),
        }
    }
}

pub(crate) fn encode(record: &SessionRecord) -> Result<String, SessionError> {
    serde_json::to_string(record).map_err(|e| SessionError::Corrupt(e.to_string()))
}

pub(crate) fn decode(raw: &str) -> Result<SessionRecord, SessionError> {
    serde_json::from_str(raw).map_err(|e| SessionError::Corrupt(e.to_string()))
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: Uuid) -> Result<Option<SessionRecord>, SessionError>;

    async fn save(&self, session_id: Uuid, record: &SessionRecord) -> Result<(), SessionError>;

    async fn delete(&self, session_id: Uuid) -> Result<(), SessionError>;
}
