use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickedUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub group_id: String,
    pub user_id: String,
    #[serde(default = "bool_true")]
    pub kicked: bool,
    pub created_at: DateTime,
}

fn bool_true() -> bool {
    true
}

impl KickedUser {
    pub const COLLECTION: &'static str = "kicked_users";

    pub fn new(group_id: &str, user_id: &str) -> Self {
        Self {
            id: None,
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
            kicked: true,
            created_at: DateTime::now(),
        }
    }
}
