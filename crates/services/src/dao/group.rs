use bson::{doc, DateTime};
use mongodb::Database;
use pomo_db::models::{
    Group, GroupAdmin, GroupContainer, GroupControls, GroupSettings, GroupTime, KickedUser,
    Participant, UserProfile,
};

use super::base::{BaseDao, DaoResult};

pub struct GroupDao {
    pub base: BaseDao<Group>,
    pub admins: BaseDao<GroupAdmin>,
    pub controls: BaseDao<GroupControls>,
    pub settings: BaseDao<GroupSettings>,
    pub time: BaseDao<GroupTime>,
    pub participant_lists: BaseDao<GroupContainer>,
    pub participants: BaseDao<Participant>,
    pub message_boards: BaseDao<GroupContainer>,
    pub kicked_lists: BaseDao<GroupContainer>,
    pub kicked: BaseDao<KickedUser>,
    pub users: BaseDao<UserProfile>,
}

impl GroupDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Group::COLLECTION),
            admins: BaseDao::new(db, GroupAdmin::COLLECTION),
            controls: BaseDao::new(db, GroupControls::COLLECTION),
            settings: BaseDao::new(db, GroupSettings::COLLECTION),
            time: BaseDao::new(db, GroupTime::COLLECTION),
            participant_lists: BaseDao::new(db, GroupContainer::PARTICIPANTS),
            participants: BaseDao::new(db, Participant::COLLECTION),
            message_boards: BaseDao::new(db, GroupContainer::MESSAGES),
            kicked_lists: BaseDao::new(db, GroupContainer::KICKED_USERS),
            kicked: BaseDao::new(db, KickedUser::COLLECTION),
            users: BaseDao::new(db, UserProfile::COLLECTION),
        }
    }

    /// Creates a group with all of its satellite documents and joins the
    /// creator as its admin.
    pub async fn create(
        &self,
        name: String,
        description: String,
        creator: &UserProfile,
    ) -> DaoResult<Group> {
        let now = DateTime::now();
        let group_id = uuid::Uuid::new_v4().simple().to_string();
        let group = Group {
            id: group_id.clone(),
            name,
            description,
            participants_count: 0,
            departing_user_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.base.insert_one(&group).await?;
        self.admins
            .insert_one(&GroupAdmin {
                group_id: group_id.clone(),
                user_id: creator.id.clone(),
            })
            .await?;
        self.controls.insert_one(&GroupControls::new(&group_id)).await?;
        self.settings.insert_one(&GroupSettings::new(&group_id)).await?;
        self.time.insert_one(&GroupTime::new(&group_id, 1500)).await?;
        self.participant_lists
            .insert_one(&GroupContainer::new(&group_id))
            .await?;
        self.message_boards
            .insert_one(&GroupContainer::new(&group_id))
            .await?;
        self.kicked_lists
            .insert_one(&GroupContainer::new(&group_id))
            .await?;

        self.join(&group_id, creator).await?;

        self.base.find_by_id(&group_id).await
    }

    pub async fn join(&self, group_id: &str, user: &UserProfile) -> DaoResult<Participant> {
        let participant = Participant::new(group_id, &user.id, &user.username);
        self.participants.insert_one(&participant).await?;

        self.base
            .update_by_id(
                group_id,
                doc! {
                    "$inc": { "participants_count": 1 },
                    "$pull": { "departing_user_ids": &user.id },
                },
            )
            .await?;
        self.users
            .update_by_id(&user.id, doc! { "$set": { "group_id": group_id } })
            .await?;

        Ok(participant)
    }

    pub async fn find_by_id(&self, group_id: &str) -> DaoResult<Option<Group>> {
        self.base.find_one(doc! { "_id": group_id }).await
    }

    pub async fn admin(&self, group_id: &str) -> DaoResult<Option<GroupAdmin>> {
        self.admins.find_one(doc! { "_id": group_id }).await
    }

    pub async fn list_participants(&self, group_id: &str) -> DaoResult<Vec<Participant>> {
        self.participants
            .find_many(doc! { "group_id": group_id }, Some(doc! { "joined_at": 1 }))
            .await
    }

    pub async fn kick(&self, group_id: &str, user_id: &str) -> DaoResult<()> {
        self.kicked.insert_one(&KickedUser::new(group_id, user_id)).await?;
        Ok(())
    }

    /// Number of documents, across every group collection, still referencing
    /// `group_id`.
    pub async fn remaining_records(&self, group_id: &str) -> DaoResult<u64> {
        let by_id = doc! { "_id": group_id };
        let by_group = doc! { "group_id": group_id };
        Ok(self.base.count(by_id.clone()).await?
            + self.admins.count(by_id.clone()).await?
            + self.controls.count(by_id.clone()).await?
            + self.settings.count(by_id.clone()).await?
            + self.time.count(by_id.clone()).await?
            + self.participant_lists.count(by_id.clone()).await?
            + self.message_boards.count(by_id.clone()).await?
            + self.kicked_lists.count(by_id).await?
            + self.participants.count(by_group.clone()).await?
            + self.kicked.count(by_group).await?)
    }
}
