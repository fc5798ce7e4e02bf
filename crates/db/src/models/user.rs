use bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub current_task_id: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl UserProfile {
    pub const COLLECTION: &'static str = "users";

    pub fn new(id: impl Into<String>, username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = DateTime::now();
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            profile_pic: None,
            group_id: None,
            current_task_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
