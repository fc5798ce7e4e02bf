use bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub group_id: String,
    pub user_id: String,
    pub username: String,
    pub profile_pic: Option<String>,
    pub message: String,
    pub created_at: DateTime,
}

impl GroupMessage {
    pub const COLLECTION: &'static str = "messages";
}
