use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;
use uuid::Uuid;

use crate::session::{decode, encode, SessionError, SessionRecord, SessionStore};

const KEY_PREFIX: &str = "rodrigo:session";

/// Stores one JSON value per session with a sliding TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, SessionError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

fn session_key(session_id: Uuid) -> String {
    format!("{KEY_PREFIX}:{session_id}")
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: Uuid) -> Result<Option<SessionRecord>, SessionError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(session_key(session_id)).await?;
        raw.as_deref().map(decode).transpose()
    }

    async fn save(&self, session_id: Uuid, record: &SessionRecord) -> Result<(), SessionError> {
        let mut conn = self.connection().await?;
        let payload = encode(record)?;
        redis::cmd("SET")
            .arg(session_key(session_id))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!("Saved session {session_id} ({} turns)", record.state.turn_count());
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> Result<(), SessionError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(session_key(session_id)).await?;
        Ok(())
    }
}
