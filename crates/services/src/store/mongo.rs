use std::sync::Arc;

use async_trait::async_trait;
use bson::{doc, Bson, DateTime, Document};
use futures::TryStreamExt;
use mongodb::{ClientSession, Database};
use pomo_db::models::{GroupAdmin, Participant, StatusDocument, UserProfile};
use tracing::warn;

use super::{ChildCollection, GroupDocument, GroupStore, GroupTxn, StatusStore, StoreResult};
use crate::dao::{group::GroupDao, status::StatusDao, user::UserDao};

pub struct MongoStatusStore {
    dao: StatusDao,
}

impl MongoStatusStore {
    pub fn new(db: &Database) -> Self {
        Self {
            dao: StatusDao::new(db),
        }
    }
}

#[async_trait]
impl StatusStore for MongoStatusStore {
    async fn get_status(&self, user_id: &str) -> StoreResult<Option<StatusDocument>> {
        Ok(self.dao.find(user_id).await?)
    }

    async fn put_status(&self, status: &StatusDocument) -> StoreResult<bool> {
        Ok(self.dao.replace_unless_newer(status).await?)
    }
}

/// MongoDB-backed group store. Every unit of work runs on its own session;
/// with `transactional` set the session also carries a multi-document
/// transaction, which needs a replica set.
pub struct MongoGroupStore {
    db: Database,
    groups: Arc<GroupDao>,
    users: Arc<UserDao>,
    transactional: bool,
}

impl MongoGroupStore {
    pub fn new(db: &Database, transactional: bool) -> Self {
        Self {
            db: db.clone(),
            groups: Arc::new(GroupDao::new(db)),
            users: Arc::new(UserDao::new(db)),
            transactional,
        }
    }
}

#[async_trait]
impl GroupStore for MongoGroupStore {
    async fn begin(&self) -> StoreResult<Box<dyn GroupTxn>> {
        let mut session = self.db.client().start_session().await?;
        if self.transactional {
            session.start_transaction().await?;
        }

        Ok(Box::new(MongoGroupTxn {
            db: self.db.clone(),
            groups: Arc::clone(&self.groups),
            users: Arc::clone(&self.users),
            session,
            transactional: self.transactional,
        }))
    }
}

pub struct MongoGroupTxn {
    db: Database,
    groups: Arc<GroupDao>,
    users: Arc<UserDao>,
    session: ClientSession,
    transactional: bool,
}

#[async_trait]
impl GroupTxn for MongoGroupTxn {
    async fn user_profile(&mut self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self
            .users
            .base
            .collection()
            .find_one(doc! { "_id": user_id })
            .session(&mut self.session)
            .await?)
    }

    async fn has_participant(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        let count = self
            .groups
            .participants
            .collection()
            .count_documents(doc! { "group_id": group_id, "user_id": user_id })
            .session(&mut self.session)
            .await?;
        Ok(count > 0)
    }

    async fn remove_participant(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        let result = self
            .groups
            .participants
            .collection()
            .delete_one(doc! { "group_id": group_id, "user_id": user_id })
            .session(&mut self.session)
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn clear_user_group(&mut self, user_id: &str) -> StoreResult<()> {
        self.users
            .base
            .collection()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "group_id": Bson::Null, "updated_at": DateTime::now() } },
            )
            .session(&mut self.session)
            .await?;
        Ok(())
    }

    async fn release_seat(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        let result = self
            .groups
            .base
            .collection()
            .update_one(
                doc! { "_id": group_id, "departing_user_ids": { "$ne": user_id } },
                doc! {
                    "$inc": { "participants_count": -1 },
                    "$addToSet": { "departing_user_ids": user_id },
                    "$set": { "updated_at": DateTime::now() },
                },
            )
            .session(&mut self.session)
            .await?;
        Ok(result.modified_count > 0)
    }

    async fn clear_departure(&mut self, group_id: &str, user_id: &str) -> StoreResult<()> {
        self.groups
            .base
            .collection()
            .update_one(
                doc! { "_id": group_id },
                doc! { "$pull": { "departing_user_ids": user_id } },
            )
            .session(&mut self.session)
            .await?;
        Ok(())
    }

    async fn clear_muted_users(&mut self, user_id: &str) -> StoreResult<()> {
        self.users
            .muted
            .collection()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$set": { "muted_user_ids": [] } },
            )
            .session(&mut self.session)
            .await?;
        Ok(())
    }

    async fn group_admin(&mut self, group_id: &str) -> StoreResult<Option<GroupAdmin>> {
        Ok(self
            .groups
            .admins
            .collection()
            .find_one(doc! { "_id": group_id })
            .session(&mut self.session)
            .await?)
    }

    async fn list_participants(&mut self, group_id: &str) -> StoreResult<Vec<Participant>> {
        let mut cursor = self
            .groups
            .participants
            .collection()
            .find(doc! { "group_id": group_id })
            .sort(doc! { "joined_at": 1 })
            .session(&mut self.session)
            .await?;
        let participants: Vec<Participant> =
            cursor.stream(&mut self.session).try_collect().await?;
        Ok(participants)
    }

    async fn set_group_admin(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        let result = self
            .groups
            .admins
            .collection()
            .update_one(
                doc! { "_id": group_id },
                doc! { "$set": { "user_id": user_id } },
            )
            .session(&mut self.session)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_group_document(
        &mut self,
        document: GroupDocument,
        group_id: &str,
    ) -> StoreResult<bool> {
        let result = self
            .db
            .collection::<Document>(document.collection())
            .delete_one(doc! { "_id": group_id })
            .session(&mut self.session)
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_children(
        &mut self,
        kind: ChildCollection,
        group_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<String>> {
        let key = kind.key_field();
        let collection = self.db.collection::<Document>(kind.collection());
        let mut projection = Document::new();
        projection.insert(key, 1);
        let mut deletable = doc! { "group_id": group_id };
        deletable.insert(key, doc! { "$type": "string" });
        let mut cursor = collection
            .find(deletable)
            .projection(projection)
            .limit(limit as i64)
            .session(&mut self.session)
            .await?;
        let docs: Vec<Document> = cursor.stream(&mut self.session).try_collect().await?;
        let keys: Vec<String> = docs
            .iter()
            .filter_map(|d| d.get_str(key).ok().map(str::to_string))
            .collect();

        // Last page: report children that can never be addressed by key
        if keys.len() < limit {
            let mut stranded = doc! { "group_id": group_id };
            stranded.insert(key, doc! { "$not": { "$type": "string" } });
            let skipped = collection
                .count_documents(stranded)
                .session(&mut self.session)
                .await?;
            if skipped > 0 {
                warn!(
                    collection = kind.collection(),
                    group_id,
                    skipped,
                    "Children without a string key cannot be deleted"
                );
            }
        }
        Ok(keys)
    }

    async fn delete_child(
        &mut self,
        kind: ChildCollection,
        group_id: &str,
        key: &str,
    ) -> StoreResult<bool> {
        let mut filter = doc! { "group_id": group_id };
        filter.insert(kind.key_field(), key);
        let result = self
            .db
            .collection::<Document>(kind.collection())
            .delete_one(filter)
            .session(&mut self.session)
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut txn = self;
        if txn.transactional {
            txn.session.commit_transaction().await?;
        }
        Ok(())
    }
}
