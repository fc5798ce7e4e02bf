use async_trait::async_trait;
use dashmap::DashMap;
use pomo_db::models::PresenceRecord;

use super::PresenceStore;
use crate::store::StoreResult;

#[derive(Default)]
pub struct MemoryPresenceStore {
    records: DashMap<String, PresenceRecord>,
}

impl MemoryPresenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn get(&self, uid: &str) -> StoreResult<Option<PresenceRecord>> {
        Ok(self.records.get(uid).map(|r| r.clone()))
    }

    async fn set(&self, uid: &str, record: &PresenceRecord) -> StoreResult<()> {
        self.records.insert(uid.to_string(), record.clone());
        Ok(())
    }
}
