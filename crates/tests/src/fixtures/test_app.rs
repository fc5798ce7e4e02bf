use std::net::SocketAddr;
use std::sync::Arc;

use pomo_api::{build_router, state::AppState};
use pomo_config::{
    AdminPolicy, AppSettings, DatabaseSettings, ReconcilerSettings, RedisSettings, Settings,
};
use pomo_services::{
    presence::MemoryPresenceStore,
    store::MemoryStore,
    sync::{GroupReconciler, PresenceMirror, ReconcilerPolicy},
};
use tokio::net::TcpListener;

/// A running trigger server over the in-memory stores.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub settings: Settings,
    pub store: MemoryStore,
    pub presence: Arc<MemoryPresenceStore>,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(|_| {}).await
    }

    /// Spawn a test server with customized settings.
    ///
    /// The `mutator` closure receives a `&mut Settings` after defaults are applied.
    pub async fn spawn_with_settings(mutator: impl FnOnce(&mut Settings)) -> Self {
        let mut settings = test_settings();
        mutator(&mut settings);

        let store = MemoryStore::new();
        let presence = Arc::new(MemoryPresenceStore::new());
        let state = AppState::new(
            settings.clone(),
            presence.clone(),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        );
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            addr,
            base_url,
            settings,
            store,
            presence,
            state,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn mirror(&self) -> &PresenceMirror {
        &self.state.mirror
    }

    pub fn reconciler(&self) -> &GroupReconciler {
        &self.state.reconciler
    }

    /// A reconciler over the same store with a different policy.
    pub fn reconciler_with(&self, policy: ReconcilerPolicy) -> GroupReconciler {
        GroupReconciler::new(Arc::new(self.store.clone()), policy)
    }
}

pub fn test_settings() -> Settings {
    Settings {
        app: AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "mongodb://localhost:27017".to_string(),
            name: "pomo_test".to_string(),
            max_pool_size: Some(5),
            min_pool_size: Some(1),
        },
        redis: RedisSettings {
            url: "redis://127.0.0.1:6379".to_string(),
            presence_prefix: "status".to_string(),
            presence_channel: "presence:changes".to_string(),
        },
        reconciler: ReconcilerSettings {
            admin_policy: AdminPolicy::OnAdminDeparture,
            transactional: false,
            teardown_batch_size: 100,
            skip_repeated_offline: false,
            watch_status_changes: false,
            listen_presence: false,
        },
    }
}
