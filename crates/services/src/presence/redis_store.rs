use async_trait::async_trait;
use pomo_db::models::PresenceRecord;
use redis::{AsyncCommands, aio::ConnectionManager};

use super::PresenceStore;
use crate::store::StoreResult;

/// Presence records stored as JSON under `{prefix}:{uid}`.
#[derive(Clone)]
pub struct RedisPresenceStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisPresenceStore {
    pub async fn connect(url: &str, prefix: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    fn key(&self, uid: &str) -> String {
        format!("{}:{}", self.prefix, uid)
    }
}

#[async_trait]
impl PresenceStore for RedisPresenceStore {
    async fn get(&self, uid: &str) -> StoreResult<Option<PresenceRecord>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.key(uid)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, uid: &str, record: &PresenceRecord) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(record)?;
        let _: () = conn.set(self.key(uid), json).await?;
        Ok(())
    }
}
