use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use pomo_db::models::{GroupAdmin, Participant, UserProfile};
use pomo_services::store::{
    ChildCollection, GroupDocument, GroupStore, GroupTxn, MemoryStore, StoreResult,
};
use tokio::sync::Mutex;

/// Runs every op in its own committed unit of work, the way MongoDB behaves
/// with `transactional = false`. A failed op leaves earlier ops applied and
/// other departures can interleave between any two ops.
#[derive(Clone)]
pub struct AutoCommitStore {
    inner: MemoryStore,
    after_listing: Arc<Mutex<Option<BoxFuture<'static, ()>>>>,
}

impl AutoCommitStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            after_listing: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs `hook` once, right after the next `list_participants` returns.
    pub async fn after_next_listing(&self, hook: impl Future<Output = ()> + Send + 'static) {
        *self.after_listing.lock().await = Some(Box::pin(hook));
    }
}

#[async_trait]
impl GroupStore for AutoCommitStore {
    async fn begin(&self) -> StoreResult<Box<dyn GroupTxn>> {
        Ok(Box::new(AutoCommitTxn {
            store: self.clone(),
        }))
    }
}

struct AutoCommitTxn {
    store: AutoCommitStore,
}

macro_rules! committed {
    ($store:expr, $txn:ident => $call:expr) => {{
        let mut $txn = $store.inner.begin().await?;
        let out = $call.await?;
        $txn.commit().await?;
        Ok(out)
    }};
}

#[async_trait]
impl GroupTxn for AutoCommitTxn {
    async fn user_profile(&mut self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        committed!(self.store, txn => txn.user_profile(user_id))
    }

    async fn has_participant(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        committed!(self.store, txn => txn.has_participant(group_id, user_id))
    }

    async fn remove_participant(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        committed!(self.store, txn => txn.remove_participant(group_id, user_id))
    }

    async fn clear_user_group(&mut self, user_id: &str) -> StoreResult<()> {
        committed!(self.store, txn => txn.clear_user_group(user_id))
    }

    async fn release_seat(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        committed!(self.store, txn => txn.release_seat(group_id, user_id))
    }

    async fn clear_departure(&mut self, group_id: &str, user_id: &str) -> StoreResult<()> {
        committed!(self.store, txn => txn.clear_departure(group_id, user_id))
    }

    async fn clear_muted_users(&mut self, user_id: &str) -> StoreResult<()> {
        committed!(self.store, txn => txn.clear_muted_users(user_id))
    }

    async fn group_admin(&mut self, group_id: &str) -> StoreResult<Option<GroupAdmin>> {
        committed!(self.store, txn => txn.group_admin(group_id))
    }

    async fn list_participants(&mut self, group_id: &str) -> StoreResult<Vec<Participant>> {
        let listed: StoreResult<Vec<Participant>> =
            committed!(self.store, txn => txn.list_participants(group_id));
        let hook = self.store.after_listing.lock().await.take();
        if let Some(hook) = hook {
            hook.await;
        }
        listed
    }

    async fn set_group_admin(&mut self, group_id: &str, user_id: &str) -> StoreResult<bool> {
        committed!(self.store, txn => txn.set_group_admin(group_id, user_id))
    }

    async fn delete_group_document(
        &mut self,
        document: GroupDocument,
        group_id: &str,
    ) -> StoreResult<bool> {
        committed!(self.store, txn => txn.delete_group_document(document, group_id))
    }

    async fn list_children(
        &mut self,
        kind: ChildCollection,
        group_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<String>> {
        committed!(self.store, txn => txn.list_children(kind, group_id, limit))
    }

    async fn delete_child(
        &mut self,
        kind: ChildCollection,
        group_id: &str,
        key: &str,
    ) -> StoreResult<bool> {
        committed!(self.store, txn => txn.delete_child(kind, group_id, key))
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}
