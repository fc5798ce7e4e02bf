use bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub participants_count: i64,
    /// Users whose departure already decremented `participants_count` but
    /// whose participant record may still exist.
    #[serde(default)]
    pub departing_user_ids: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Group {
    pub const COLLECTION: &'static str = "groups";
}

/// Admin of a group, stored under the group's id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupAdmin {
    #[serde(rename = "_id")]
    pub group_id: String,
    pub user_id: String,
}

impl GroupAdmin {
    pub const COLLECTION: &'static str = "group_admins";
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    #[default]
    Pomodoro,
    ShortBreak,
    LongBreak,
}

/// Shared timer controls of a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupControls {
    #[serde(rename = "_id")]
    pub group_id: String,
    #[serde(default)]
    pub mode: TimerMode,
    #[serde(default)]
    pub is_running: bool,
    #[serde(default)]
    pub is_paused: bool,
}

impl GroupControls {
    pub const COLLECTION: &'static str = "group_controls";

    pub fn new(group_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            mode: TimerMode::default(),
            is_running: false,
            is_paused: false,
        }
    }
}

/// Timer lengths in seconds shared by a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSettings {
    #[serde(rename = "_id")]
    pub group_id: String,
    pub pomodoro: u32,
    pub short_break: u32,
    pub long_break: u32,
    pub auto_start_break: bool,
    pub auto_start_pomodoro: bool,
    pub long_break_interval: u32,
}

impl GroupSettings {
    pub const COLLECTION: &'static str = "group_settings";

    pub fn new(group_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            pomodoro: 1500,
            short_break: 300,
            long_break: 900,
            auto_start_break: false,
            auto_start_pomodoro: false,
            long_break_interval: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTime {
    #[serde(rename = "_id")]
    pub group_id: String,
    /// Seconds left on the shared timer.
    pub time: i64,
    pub updated_at: DateTime,
}

impl GroupTime {
    pub const COLLECTION: &'static str = "group_time";

    pub fn new(group_id: &str, time: i64) -> Self {
        Self {
            group_id: group_id.to_string(),
            time,
            updated_at: DateTime::now(),
        }
    }
}

/// Parent document of a per-group child collection (participants, messages,
/// kicked users). Children reference the group through their `group_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupContainer {
    #[serde(rename = "_id")]
    pub group_id: String,
    pub created_at: DateTime,
}

impl GroupContainer {
    pub const PARTICIPANTS: &'static str = "participant_lists";
    pub const MESSAGES: &'static str = "message_boards";
    pub const KICKED_USERS: &'static str = "kicked_user_lists";

    pub fn new(group_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            created_at: DateTime::now(),
        }
    }
}
