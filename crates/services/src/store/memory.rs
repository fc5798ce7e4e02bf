use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bson::DateTime;
use dashmap::DashMap;
use pomo_db::models::{
    Group, GroupAdmin, GroupContainer, GroupControls, GroupMessage, GroupSettings, GroupTime,
    KickedUser, MutedUsers, Participant, StatusDocument, UserProfile,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    ChildCollection, GroupDocument, GroupStore, GroupTxn, StatusStore, StoreError, StoreResult,
};

/// Every collection the pipeline touches. Child records are keyed by
/// `(group_id, child key)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub users: HashMap<String, UserProfile>,
    pub statuses: HashMap<String, StatusDocument>,
    pub muted: HashMap<String, MutedUsers>,
    pub groups: HashMap<String, Group>,
    pub admins: HashMap<String, GroupAdmin>,
    pub controls: HashMap<String, GroupControls>,
    pub settings: HashMap<String, GroupSettings>,
    pub time: HashMap<String, GroupTime>,
    pub participant_lists: HashMap<String, GroupContainer>,
    pub message_boards: HashMap<String, GroupContainer>,
    pub kicked_lists: HashMap<String, GroupContainer>,
    pub participants: BTreeMap<(String, String), Participant>,
    pub messages: BTreeMap<(String, String), GroupMessage>,
    pub kicked: BTreeMap<(String, String), KickedUser>,
}

impl MemoryState {
    pub fn participants_of(&self, group_id: &str) -> Vec<&Participant> {
        self.participants
            .iter()
            .filter(|((g, _), _)| g == group_id)
            .map(|(_, p)| p)
            .collect()
    }

    /// Records of any kind still referencing `group_id`.
    pub fn group_records(&self, group_id: &str) -> usize {
        let singles = [
            self.groups.contains_key(group_id),
            self.admins.contains_key(group_id),
            self.controls.contains_key(group_id),
            self.settings.contains_key(group_id),
            self.time.contains_key(group_id),
            self.participant_lists.contains_key(group_id),
            self.message_boards.contains_key(group_id),
            self.kicked_lists.contains_key(group_id),
        ]
        .into_iter()
        .filter(|present| *present)
        .count();

        singles
            + self.participants.keys().filter(|(g, _)| g == group_id).count()
            + self.messages.keys().filter(|(g, _)| g == group_id).count()
            + self.kicked.keys().filter(|(g, _)| g == group_id).count()
    }

    fn delete_document(&mut self, document: GroupDocument, group_id: &str) -> bool {
        match document {
            GroupDocument::Group => self.groups.remove(group_id).is_some(),
            GroupDocument::Controls => self.controls.remove(group_id).is_some(),
            GroupDocument::Settings => self.settings.remove(group_id).is_some(),
            GroupDocument::Time => self.time.remove(group_id).is_some(),
            GroupDocument::Admin => self.admins.remove(group_id).is_some(),
            GroupDocument::ParticipantList => self.participant_lists.remove(group_id).is_some(),
            GroupDocument::MessageBoard => self.message_boards.remove(group_id).is_some(),
            GroupDocument::KickedList => self.kicked_lists.remove(group_id).is_some(),
        }
    }

    fn child_keys(&self, kind: ChildCollection, group_id: &str) -> Vec<String> {
        let matches = |(g, _): &&(String, String)| g == group_id;
        match kind {
            ChildCollection::Messages => self
                .messages
                .keys()
                .filter(matches)
                .map(|(_, k)| k.clone())
                .collect(),
            ChildCollection::KickedUsers => self
                .kicked
                .keys()
                .filter(matches)
                .map(|(_, k)| k.clone())
                .collect(),
        }
    }
}

#[derive(Default)]
struct Inner {
    state: Arc<Mutex<MemoryState>>,
    writes: AtomicU64,
    /// Calls of an op still allowed to succeed before it fails.
    faults: DashMap<&'static str, usize>,
}

impl Inner {
    fn check(&self, op: &'static str) -> StoreResult<()> {
        if self.faults.remove_if(op, |_, left| *left == 0).is_some() {
            return Err(StoreError::Injected(op));
        }
        if let Some(mut left) = self.faults.get_mut(op) {
            *left -= 1;
        }
        Ok(())
    }
}

/// In-process store implementing both [`StatusStore`] and [`GroupStore`].
///
/// A unit of work holds the state lock from `begin` to `commit` and applies
/// its writes to a private copy, so a failed or dropped unit leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.inner.state.lock().await.clone()
    }

    /// Writes made through the store traits. Seeding helpers do not count.
    pub fn writes(&self) -> u64 {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Makes the next call of `op` fail with [`StoreError::Injected`].
    pub fn fail_next(&self, op: &'static str) {
        self.fail_after(op, 0);
    }

    /// Lets `op` succeed `calls` more times, then fails it once.
    pub fn fail_after(&self, op: &'static str, calls: usize) {
        self.inner.faults.insert(op, calls);
    }

    pub async fn insert_user(&self, profile: UserProfile) {
        let mut state = self.inner.state.lock().await;
        state.users.insert(profile.id.clone(), profile);
    }

    pub async fn user(&self, user_id: &str) -> Option<UserProfile> {
        self.inner.state.lock().await.users.get(user_id).cloned()
    }

    /// Creates a group with every satellite document, with `creator_id` as
    /// admin and first participant.
    pub async fn create_group(&self, group_id: &str, name: &str, creator_id: &str) {
        let now = DateTime::now();
        {
            let mut guard = self.inner.state.lock().await;
            let state = &mut *guard;
            state.groups.insert(
                group_id.to_string(),
                Group {
                    id: group_id.to_string(),
                    name: name.to_string(),
                    description: String::new(),
                    participants_count: 0,
                    departing_user_ids: Vec::new(),
                    created_at: now,
                    updated_at: now,
                },
            );
            state.admins.insert(
                group_id.to_string(),
                GroupAdmin {
                    group_id: group_id.to_string(),
                    user_id: creator_id.to_string(),
                },
            );
            state
                .controls
                .insert(group_id.to_string(), GroupControls::new(group_id));
            state
                .settings
                .insert(group_id.to_string(), GroupSettings::new(group_id));
            state
                .time
                .insert(group_id.to_string(), GroupTime::new(group_id, 1500));
            for containers in [
                &mut state.participant_lists,
                &mut state.message_boards,
                &mut state.kicked_lists,
            ] {
                containers.insert(group_id.to_string(), GroupContainer::new(group_id));
            }
        }
        self.join_group(group_id, creator_id).await;
    }

    pub async fn join_group(&self, group_id: &str, user_id: &str) {
        let mut state = self.inner.state.lock().await;
        let name = state
            .users
            .get(user_id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| user_id.to_string());
        state.participants.insert(
            (group_id.to_string(), user_id.to_string()),
            Participant::new(group_id, user_id, &name),
        );
        if let Some(group) = state.groups.get_mut(group_id) {
            group.participants_count += 1;
            group.departing_user_ids.retain(|u| u != user_id);
        }
        if let Some(user) = state.users.get_mut(user_id) {
            user.group_id = Some(group_id.to_string());
        }
    }

    pub async fn set_admin(&self, group_id: &str, user_id: &str) {
        self.inner.state.lock().await.admins.insert(
            group_id.to_string(),
            GroupAdmin {
                group_id: group_id.to_string(),
                user_id: user_id.to_string(),
            },
        );
    }

    pub async fn add_message(&self, group_id: &str, user_id: &str, text: &str) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut state = self.inner.state.lock().await;
        let username = state
            .users
            .get(user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        state.messages.insert(
            (group_id.to_string(), id.clone()),
            GroupMessage {
                id: id.clone(),
                group_id: group_id.to_string(),
                user_id: user_id.to_string(),
                username,
                profile_pic: None,
                message: text.to_string(),
                created_at: DateTime::now(),
            },
        );
        id
    }

    pub async fn kick(&self, group_id: &str, user_id: &str) {
        self.inner.state.lock().await.kicked.insert(
            (group_id.to_string(), user_id.to_string()),
            KickedUser::new(group_id, user_id),
        );
    }

    pub async fn mute(&self, user_id: &str, muted_user_id: &str) {
        let mut state = self.inner.state.lock().await;
        let entry = state
            .muted
            .entry(user_id.to_string())
            .or_insert_with(|| MutedUsers {
                user_id: user_id.to_string(),
                muted_user_ids: Vec::new(),
            });
        if !entry.muted_user_ids.iter().any(|m| m == muted_user_id) {
            entry.muted_user_ids.push(muted_user_id.to_string());
        }
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn get_status(&self, user_id: &str) -> StoreResult<Option<StatusDocument>> {
        self.inner.check("get_status")?;
        Ok(self.inner.state.lock().await.statuses.get(user_id).cloned())
    }

    async fn put_status(&self, status: &StatusDocument) -> StoreResult<bool> {
        self.inner.check("put_status")?;
        let mut state = self.inner.state.lock().await;
        if let Some(existing) = state.statuses.get(&status.user_id) {
            if existing.last_changed > status.last_changed {
                return Ok(false);
            }
        }
        state
            .statuses
            .insert(status.user_id.clone(), status.clone());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn GroupTxn>> {
        self.inner.check("begin")?;
        let guard = Arc::clone(&self.inner.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryTxn {
            inner: Arc::clone(&self.inner),
            guard,
            staged,
            writes: 0,
        }))
    }
}

pub struct MemoryTxn {
    inner: Arc<Inner>,
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    writes: u64,
}

impl MemoryTxn {
    fn write(&mut self, op: &'static str) -> StoreResult<&mut MemoryState> {
        self.inner.check(op)?;
        self.writes += 1;
        Ok(&mut self.staged)
    }

    fn read(&self, op: &'static str) -> StoreResult<&MemoryState> {
        self.inner.check(op)?;
        Ok(&self.staged)
    }
}

#[async_trait]
impl GroupTxn for MemoryTxn {
    async fn user_profile(&mut self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.read("user_profile")?.users.get(user_id).cloned())
    }

    async fn has_participant(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        Ok(self
            .read("has_participant")?
            .participants
            .contains_key(&(group_id.to_string(), user_id.to_string())))
    }

    async fn remove_participant(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        let state = self.write("remove_participant")?;
        Ok(state
            .participants
            .remove(&(group_id.to_string(), user_id.to_string()))
            .is_some())
    }

    async fn clear_user_group(&mut self, user_id: &str) -> StoreResult<()> {
        let state = self.write("clear_user_group")?;
        if let Some(user) = state.users.get_mut(user_id) {
            user.group_id = None;
            user.updated_at = DateTime::now();
        }
        Ok(())
    }

    async fn release_seat(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        let state = self.write("release_seat")?;
        let Some(group) = state.groups.get_mut(group_id) else {
            return Ok(false);
        };
        if group.departing_user_ids.iter().any(|u| u == user_id) {
            return Ok(false);
        }
        group.participants_count -= 1;
        group.departing_user_ids.push(user_id.to_string());
        group.updated_at = DateTime::now();
        Ok(true)
    }

    async fn clear_departure(&mut self, group_id: &str, user_id: &str) -> StoreResult<()> {
        let state = self.write("clear_departure")?;
        if let Some(group) = state.groups.get_mut(group_id) {
            group.departing_user_ids.retain(|u| u != user_id);
        }
        Ok(())
    }

    async fn clear_muted_users(&mut self, user_id: &str) -> StoreResult<()> {
        let state = self.write("clear_muted_users")?;
        if let Some(muted) = state.muted.get_mut(user_id) {
            muted.muted_user_ids.clear();
        }
        Ok(())
    }

    async fn group_admin(&mut self, group_id: &str) -> StoreResult<Option<GroupAdmin>> {
        Ok(self.read("group_admin")?.admins.get(group_id).cloned())
    }

    async fn list_participants(&mut self, group_id: &str) -> StoreResult<Vec<Participant>> {
        let mut participants: Vec<Participant> = self
            .read("list_participants")?
            .participants_of(group_id)
            .into_iter()
            .cloned()
            .collect();
        participants.sort_by_key(|p| p.joined_at);
        Ok(participants)
    }

    async fn set_group_admin(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        let state = self.write("set_group_admin")?;
        let Some(admin) = state.admins.get_mut(group_id) else {
            return Ok(false);
        };
        admin.user_id = user_id.to_string();
        Ok(true)
    }

    async fn delete_group_document(
        &mut self,
        document: GroupDocument,
        group_id: &str,
    ) -> StoreResult<bool> {
        Ok(self
            .write("delete_group_document")?
            .delete_document(document, group_id))
    }

    async fn list_children(
        &mut self,
        kind: ChildCollection,
        group_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<String>> {
        let mut keys = self.read("list_children")?.child_keys(kind, group_id);
        keys.truncate(limit);
        Ok(keys)
    }

    async fn delete_child(
        &mut self,
        kind: ChildCollection,
        group_id: &str,
        key: &str,
    ) -> StoreResult<bool> {
        let state = self.write("delete_child")?;
        let id = (group_id.to_string(), key.to_string());
        Ok(match kind {
            ChildCollection::Messages => state.messages.remove(&id).is_some(),
            ChildCollection::KickedUsers => state.kicked.remove(&id).is_some(),
        })
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.inner.check("commit")?;
        let MemoryTxn {
            inner,
            mut guard,
            staged,
            writes,
        } = *self;
        *guard = staged;
        inner.writes.fetch_add(writes, Ordering::SeqCst);
        Ok(())
    }
}
