use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PresenceState {
    Online,
    Offline,
}

impl PresenceState {
    pub fn is_offline(self) -> bool {
        self == PresenceState::Offline
    }
}

/// Live connection state of a user, kept in the presence substrate under the
/// user's uid. Last writer wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresenceRecord {
    pub state: PresenceState,
    /// Epoch milliseconds.
    pub last_changed: i64,
}

impl PresenceRecord {
    pub fn online(last_changed: i64) -> Self {
        Self {
            state: PresenceState::Online,
            last_changed,
        }
    }

    pub fn offline(last_changed: i64) -> Self {
        Self {
            state: PresenceState::Offline,
            last_changed,
        }
    }
}
