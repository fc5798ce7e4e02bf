use bson::{doc, DateTime};
use mongodb::Database;
use pomo_db::models::{GroupMessage, UserProfile};

use super::base::{BaseDao, DaoResult};

pub struct MessageDao {
    pub base: BaseDao<GroupMessage>,
}

impl MessageDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, GroupMessage::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        group_id: &str,
        author: &UserProfile,
        message: String,
    ) -> DaoResult<GroupMessage> {
        let message = GroupMessage {
            id: uuid::Uuid::new_v4().simple().to_string(),
            group_id: group_id.to_string(),
            user_id: author.id.clone(),
            username: author.username.clone(),
            profile_pic: author.profile_pic.clone(),
            message,
            created_at: DateTime::now(),
        };

        self.base.insert_one(&message).await?;
        Ok(message)
    }

    pub async fn count_in_group(&self, group_id: &str) -> DaoResult<u64> {
        self.base.count(doc! { "group_id": group_id }).await
    }
}
