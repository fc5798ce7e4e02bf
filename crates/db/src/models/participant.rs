use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Membership of one user in one group. Existence of the record is the
/// membership itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub group_id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub pomodoro_count: u32,
    pub joined_at: DateTime,
    #[serde(default)]
    pub pomodoro: bool,
    #[serde(default)]
    pub short_break: bool,
    #[serde(default)]
    pub long_break: bool,
    #[serde(default = "bool_true")]
    pub show_timer: bool,
    #[serde(default = "bool_true")]
    pub show_tasks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pomodoros: u32,
    #[serde(default)]
    pub complete: bool,
}

fn bool_true() -> bool {
    true
}

impl Participant {
    pub const COLLECTION: &'static str = "participants";

    pub fn new(group_id: &str, user_id: &str, name: &str) -> Self {
        Self {
            id: None,
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            tasks: Vec::new(),
            time: 0,
            pomodoro_count: 0,
            joined_at: DateTime::now(),
            pomodoro: true,
            short_break: false,
            long_break: false,
            show_timer: true,
            show_tasks: true,
        }
    }
}
