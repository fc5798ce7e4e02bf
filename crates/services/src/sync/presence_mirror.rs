use std::sync::Arc;

use pomo_db::models::StatusDocument;
use serde::Serialize;
use tracing::{debug, info};

use super::{
    SyncResult,
    events::{PresenceChange, validate_user_id},
};
use crate::{presence::PresenceStore, store::StatusStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorOutcome {
    Written,
    Stale,
}

/// Copies presence records into durable status documents, dropping events
/// that a later write has already superseded.
pub struct PresenceMirror {
    presence: Arc<dyn PresenceStore>,
    statuses: Arc<dyn StatusStore>,
}

impl PresenceMirror {
    pub fn new(presence: Arc<dyn PresenceStore>, statuses: Arc<dyn StatusStore>) -> Self {
        Self { presence, statuses }
    }

    pub async fn handle(&self, uid: &str, change: &PresenceChange) -> SyncResult<MirrorOutcome> {
        validate_user_id(uid)?;
        change.validate()?;
        let event = &change.after;

        // The snapshot in the event may already be overwritten; compare
        // against what the substrate holds now.
        let current = self.presence.get(uid).await?;
        debug!(uid, ?current, ?event, "Presence change received");

        if let Some(current) = &current {
            if current.last_changed > event.last_changed {
                debug!(
                    uid,
                    current = current.last_changed,
                    event = event.last_changed,
                    "Stale presence event skipped"
                );
                return Ok(MirrorOutcome::Stale);
            }
        }

        let status = StatusDocument::from_presence(uid, event);
        if !self.statuses.put_status(&status).await? {
            debug!(uid, event = event.last_changed, "Status document is newer, not overwritten");
            return Ok(MirrorOutcome::Stale);
        }

        info!(uid, state = ?event.state, last_changed = event.last_changed, "Status mirrored");
        Ok(MirrorOutcome::Written)
    }
}
