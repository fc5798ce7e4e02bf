pub mod dao;
pub mod presence;
pub mod store;
pub mod sync;

pub use dao::*;
pub use presence::{MemoryPresenceStore, PresenceStore, RedisPresenceStore};
pub use store::{GroupStore, GroupTxn, MemoryStore, MongoGroupStore, MongoStatusStore, StatusStore};
pub use sync::{GroupReconciler, PresenceMirror, ReconcilerPolicy, SyncError};
