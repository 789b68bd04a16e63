use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::session::{SessionError, SessionRecord, SessionStore};

/// Process-local store used when no redis URL is configured. Nothing expires.
#[derive(Default)]
pub struct InMemorySessionStore {
    records: RwLock<HashMap<Uuid, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: Uuid) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.records.read().await.get(&session_id).cloned())
    }

    async fn save(&self, session_id: Uuid, record: &SessionRecord) -> Result<(), SessionError> {
        self.records
            .write()
            .await
            .insert(session_id, record.clone());
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> Result<(), SessionError> {
        self.records.write().await.remove(&session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::conversation::ConversationState;

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = InMemorySessionStore::new();
        let id = Uuid::new_v4();
        assert!(store.load(id).await.unwrap().is_none());

        let record = SessionRecord {
            state: ConversationState::default().record_exchange("Hola", "¡Hola!"),
            ..Default::default()
        };
        store.save(id, &record).await.unwrap();
        assert_eq!(store.load(id).await.unwrap(), Some(record));

        store.delete(id).await.unwrap();
        assert!(store.load(id).await.unwrap().is_none());
    }
}
