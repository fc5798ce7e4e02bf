//! Presence-to-status mirroring and the group reconciliation that follows a
//! user going offline.

pub mod admin;
pub mod events;
pub mod group_reconciler;
pub mod presence_mirror;
pub mod teardown;

use thiserror::Error;

use crate::store::StoreError;

pub use admin::AdminChange;
pub use events::{PresenceChange, StatusChange, StatusSnapshot};
pub use group_reconciler::{GroupReconciler, ReconcileOutcome, ReconcilerPolicy};
pub use presence_mirror::{MirrorOutcome, PresenceMirror};
pub use teardown::TeardownReport;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

pub type SyncResult<T> = Result<T, SyncError>;
