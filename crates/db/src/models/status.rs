use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::presence::{PresenceRecord, PresenceState};

/// Durable mirror of a user's presence record. `last_changed` never moves
/// backwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusDocument {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub state: PresenceState,
    pub last_changed: DateTime,
}

impl StatusDocument {
    pub const COLLECTION: &'static str = "status";

    pub fn from_presence(user_id: &str, record: &PresenceRecord) -> Self {
        Self {
            user_id: user_id.to_string(),
            state: record.state,
            last_changed: DateTime::from_millis(record.last_changed),
        }
    }
}
