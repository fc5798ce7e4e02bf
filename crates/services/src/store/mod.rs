pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use pomo_db::models::{
    Group, GroupAdmin, GroupContainer, GroupControls, GroupMessage, GroupSettings, GroupTime,
    KickedUser, Participant, StatusDocument, UserProfile,
};
use serde::Serialize;
use thiserror::Error;

use crate::dao::base::DaoError;

pub use memory::MemoryStore;
pub use mongo::{MongoGroupStore, MongoStatusStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Dao(#[from] DaoError),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Injected fault: {0}")]
    Injected(&'static str),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Dao(DaoError::Mongo(err))
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(err: bson::de::Error) -> Self {
        StoreError::Dao(DaoError::BsonDe(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Single documents stored under a group's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupDocument {
    Group,
    Controls,
    Settings,
    Time,
    Admin,
    ParticipantList,
    MessageBoard,
    KickedList,
}

impl GroupDocument {
    pub fn collection(self) -> &'static str {
        match self {
            GroupDocument::Group => Group::COLLECTION,
            GroupDocument::Controls => GroupControls::COLLECTION,
            GroupDocument::Settings => GroupSettings::COLLECTION,
            GroupDocument::Time => GroupTime::COLLECTION,
            GroupDocument::Admin => GroupAdmin::COLLECTION,
            GroupDocument::ParticipantList => GroupContainer::PARTICIPANTS,
            GroupDocument::MessageBoard => GroupContainer::MESSAGES,
            GroupDocument::KickedList => GroupContainer::KICKED_USERS,
        }
    }
}

/// Per-group collections whose records are enumerated one by one on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildCollection {
    Messages,
    KickedUsers,
}

impl ChildCollection {
    pub fn collection(self) -> &'static str {
        match self {
            ChildCollection::Messages => GroupMessage::COLLECTION,
            ChildCollection::KickedUsers => KickedUser::COLLECTION,
        }
    }

    /// Field identifying a child within its group.
    pub fn key_field(self) -> &'static str {
        match self {
            ChildCollection::Messages => "_id",
            ChildCollection::KickedUsers => "user_id",
        }
    }

    pub fn container(self) -> GroupDocument {
        match self {
            ChildCollection::Messages => GroupDocument::MessageBoard,
            ChildCollection::KickedUsers => GroupDocument::KickedList,
        }
    }
}

/// Durable status documents.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn get_status(&self, user_id: &str) -> StoreResult<Option<StatusDocument>>;

    /// Overwrites the status document of `status.user_id` unless the stored
    /// one has a newer `last_changed`. Returns whether it was written.
    async fn put_status(&self, status: &StatusDocument) -> StoreResult<bool>;
}

/// Durable group state. Every departure runs through one [`GroupTxn`].
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn GroupTxn>>;
}

/// Unit of work over the group collections. Nothing is guaranteed to be
/// visible to other readers before [`GroupTxn::commit`]; dropping the handle
/// without committing discards what the backend is able to roll back.
#[async_trait]
pub trait GroupTxn: Send {
    async fn user_profile(&mut self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    async fn has_participant(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool>;

    /// Returns `false` when there was no such participant.
    async fn remove_participant(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool>;

    async fn clear_user_group(&mut self, user_id: &str) -> StoreResult<()>;

    /// Decrements `participants_count` with `$inc` and records `user_id` in
    /// `departing_user_ids`, both on the group document in one update.
    /// Returns `false` when the user was already recorded or the group is gone.
    async fn release_seat(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool>;

    /// Drops `user_id` from `departing_user_ids`.
    async fn clear_departure(&mut self, group_id: &str, user_id: &str) -> StoreResult<()>;

    async fn clear_muted_users(&mut self, user_id: &str) -> StoreResult<()>;

    async fn group_admin(&mut self, group_id: &str) -> StoreResult<Option<GroupAdmin>>;

    async fn list_participants(&mut self, group_id: &str) -> StoreResult<Vec<Participant>>;

    /// Updates an existing admin document only. Returns `false` when there is
    /// none, which means the group was deleted meanwhile.
    async fn set_group_admin(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool>;

    /// Returns `false` when the document did not exist.
    async fn delete_group_document(
        &mut self,
        document: GroupDocument,
        group_id: &str,
    ) -> StoreResult<bool>;

    /// Keys of at most `limit` children of `group_id`.
    async fn list_children(
        &mut self,
        kind: ChildCollection,
        group_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<String>>;

    async fn delete_child(
        &mut self,
        kind: ChildCollection,
        group_id: &str,
        key: &str,
    ) -> StoreResult<bool>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
