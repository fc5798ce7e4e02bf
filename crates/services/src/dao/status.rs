use bson::doc;
use mongodb::Database;
use pomo_db::models::StatusDocument;

use super::base::{map_write_error, BaseDao, DaoError, DaoResult};

pub struct StatusDao {
    pub base: BaseDao<StatusDocument>,
}

impl StatusDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, StatusDocument::COLLECTION),
        }
    }

    pub async fn find(&self, user_id: &str) -> DaoResult<Option<StatusDocument>> {
        self.base.find_one(doc! { "_id": user_id }).await
    }

    /// Replaces the status document unless the stored one is newer.
    ///
    /// The filter only matches a document that is not newer than `status`;
    /// when a newer one exists the upsert collides on `_id` and nothing is
    /// written. Returns `false` in that case.
    pub async fn replace_unless_newer(&self, status: &StatusDocument) -> DaoResult<bool> {
        let result = self
            .base
            .collection()
            .replace_one(
                doc! {
                    "_id": &status.user_id,
                    "last_changed": { "$lte": status.last_changed },
                },
                status,
            )
            .upsert(true)
            .await
            .map_err(map_write_error);

        match result {
            Ok(_) => Ok(true),
            Err(DaoError::DuplicateKey(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
