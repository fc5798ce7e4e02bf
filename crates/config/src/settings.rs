use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub reconciler: ReconcilerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
    /// Presence records live under `{presence_prefix}:{uid}`.
    pub presence_prefix: String,
    /// Pub/sub channel carrying presence change events.
    pub presence_channel: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReconcilerSettings {
    pub admin_policy: AdminPolicy,
    /// Run each departure inside a MongoDB multi-document transaction.
    /// Requires a replica set.
    pub transactional: bool,
    pub teardown_batch_size: usize,
    pub skip_repeated_offline: bool,
    pub watch_status_changes: bool,
    pub listen_presence: bool,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            admin_policy: AdminPolicy::default(),
            transactional: false,
            teardown_batch_size: 100,
            skip_repeated_offline: false,
            watch_status_changes: true,
            listen_presence: true,
        }
    }
}

/// When a group with remaining participants gets a new admin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminPolicy {
    /// Keep the current admin unless they are the one leaving
    /// (or no longer a participant).
    #[default]
    OnAdminDeparture,
    /// Pick a random remaining participant on every departure.
    Always,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("POMO"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "pomo")?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("redis.presence_prefix", "status")?
            .set_default("redis.presence_channel", "presence:changes")?
            .set_default("reconciler.admin_policy", "on_admin_departure")?
            .set_default("reconciler.transactional", false)?
            .set_default("reconciler.teardown_batch_size", 100)?
            .set_default("reconciler.skip_repeated_offline", false)?
            .set_default("reconciler.watch_status_changes", true)?
            .set_default("reconciler.listen_presence", true)?
            .build()?;

        config.try_deserialize()
    }
}
