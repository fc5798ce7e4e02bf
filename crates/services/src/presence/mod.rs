pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use pomo_db::models::PresenceRecord;

use crate::store::StoreResult;

pub use memory::MemoryPresenceStore;
pub use redis_store::RedisPresenceStore;

/// The low-latency presence substrate: one last-writer-wins record per uid.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    async fn get(&self, uid: &str) -> StoreResult<Option<PresenceRecord>>;
    async fn set(&self, uid: &str, record: &PresenceRecord) -> StoreResult<()>;
}
