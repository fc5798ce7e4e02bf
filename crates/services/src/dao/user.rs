use bson::doc;
use mongodb::Database;
use pomo_db::models::{MutedUsers, UserProfile};

use super::base::{BaseDao, DaoResult};

pub struct UserDao {
    pub base: BaseDao<UserProfile>,
    pub muted: BaseDao<MutedUsers>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, UserProfile::COLLECTION),
            muted: BaseDao::new(db, MutedUsers::COLLECTION),
        }
    }

    pub async fn create(&self, profile: &UserProfile) -> DaoResult<UserProfile> {
        self.base.insert_one(profile).await?;
        self.base.find_by_id(&profile.id).await
    }

    pub async fn find_by_id(&self, user_id: &str) -> DaoResult<Option<UserProfile>> {
        self.base.find_one(doc! { "_id": user_id }).await
    }

    pub async fn mute(&self, user_id: &str, muted_user_id: &str) -> DaoResult<()> {
        self.muted
            .collection()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$addToSet": { "muted_user_ids": muted_user_id } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    pub async fn muted_users(&self, user_id: &str) -> DaoResult<Option<MutedUsers>> {
        self.muted.find_one(doc! { "_id": user_id }).await
    }
}
