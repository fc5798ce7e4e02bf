use std::sync::Arc;

use mongodb::Database;
use pomo_config::Settings;
use pomo_services::{
    presence::{PresenceStore, RedisPresenceStore},
    store::{GroupStore, MongoGroupStore, MongoStatusStore, StatusStore, StoreResult},
    sync::{GroupReconciler, PresenceMirror, ReconcilerPolicy},
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub presence: Arc<dyn PresenceStore>,
    pub mirror: Arc<PresenceMirror>,
    pub reconciler: Arc<GroupReconciler>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        presence: Arc<dyn PresenceStore>,
        statuses: Arc<dyn StatusStore>,
        groups: Arc<dyn GroupStore>,
    ) -> Self {
        let mirror = Arc::new(PresenceMirror::new(Arc::clone(&presence), statuses));
        let policy = ReconcilerPolicy::from(&settings.reconciler);
        let reconciler = Arc::new(GroupReconciler::new(groups, policy));

        Self {
            settings,
            presence,
            mirror,
            reconciler,
        }
    }

    /// Wires the Redis presence substrate and the MongoDB stores.
    pub async fn connect(db: &Database, settings: Settings) -> StoreResult<Self> {
        let presence = RedisPresenceStore::connect(
            &settings.redis.url,
            &settings.redis.presence_prefix,
        )
        .await?;
        let statuses = MongoStatusStore::new(db);
        let groups = MongoGroupStore::new(db, settings.reconciler.transactional);

        Ok(Self::new(
            settings,
            Arc::new(presence),
            Arc::new(statuses),
            Arc::new(groups),
        ))
    }
}
