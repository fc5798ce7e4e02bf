use chrono::{DateTime, Utc};
use pomo_db::models::{PresenceRecord, PresenceState, StatusDocument};
use serde::{Deserialize, Serialize};

use super::{SyncError, SyncResult};

/// A write to a presence record, as delivered by the presence substrate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceChange {
    #[serde(default)]
    pub before: Option<PresenceRecord>,
    pub after: PresenceRecord,
}

impl PresenceChange {
    pub fn validate(&self) -> SyncResult<()> {
        if self.after.last_changed < 0 {
            return Err(SyncError::InvalidEvent(format!(
                "negative last_changed: {}",
                self.after.last_changed
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StatusSnapshot {
    pub state: PresenceState,
    #[serde(default)]
    pub last_changed: Option<DateTime<Utc>>,
}

impl From<&StatusDocument> for StatusSnapshot {
    fn from(doc: &StatusDocument) -> Self {
        Self {
            state: doc.state,
            last_changed: Some(doc.last_changed.to_chrono()),
        }
    }
}

/// An update of a durable status document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub before: Option<StatusSnapshot>,
    pub after: StatusSnapshot,
}

impl StatusChange {
    pub fn offline() -> Self {
        Self {
            before: Some(StatusSnapshot {
                state: PresenceState::Online,
                last_changed: None,
            }),
            after: StatusSnapshot {
                state: PresenceState::Offline,
                last_changed: Some(Utc::now()),
            },
        }
    }
}

pub fn validate_user_id(user_id: &str) -> SyncResult<()> {
    if user_id.trim().is_empty() {
        return Err(SyncError::InvalidEvent("empty user id".to_string()));
    }
    if user_id.contains('/') {
        return Err(SyncError::InvalidEvent(format!("invalid user id: {user_id}")));
    }
    Ok(())
}
