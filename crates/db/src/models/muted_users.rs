use serde::{Deserialize, Serialize};

/// Users muted by `user_id`. Keyed by the muting user, not by group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MutedUsers {
    #[serde(rename = "_id")]
    pub user_id: String,
    #[serde(default)]
    pub muted_user_ids: Vec<String>,
}

impl MutedUsers {
    pub const COLLECTION: &'static str = "muted_users";
}
