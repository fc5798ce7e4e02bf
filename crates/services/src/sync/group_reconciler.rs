use std::sync::Arc;

use pomo_config::{AdminPolicy, ReconcilerSettings};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    SyncResult,
    admin::{self, AdminChange},
    events::{StatusChange, validate_user_id},
    teardown::{self, TeardownReport},
};
use crate::store::{GroupStore, GroupTxn};

#[derive(Debug, Clone, Copy)]
pub struct ReconcilerPolicy {
    pub admin_policy: AdminPolicy,
    pub teardown_batch_size: usize,
    /// Ignore updates whose previous state was already offline.
    pub skip_repeated_offline: bool,
}

impl Default for ReconcilerPolicy {
    fn default() -> Self {
        Self::from(&ReconcilerSettings::default())
    }
}

impl From<&ReconcilerSettings> for ReconcilerPolicy {
    fn from(settings: &ReconcilerSettings) -> Self {
        Self {
            admin_policy: settings.admin_policy,
            teardown_batch_size: settings.teardown_batch_size,
            skip_repeated_offline: settings.skip_repeated_offline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    NoProfile,
    NotOffline,
    RepeatedOffline,
    NotInGroup,
    LeftGroup {
        group_id: String,
        participant_removed: bool,
        remaining: usize,
        admin: AdminChange,
    },
    GroupDeleted {
        group_id: String,
        participant_removed: bool,
        teardown: TeardownReport,
    },
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            ReconcileOutcome::NoProfile
                | ReconcileOutcome::NotOffline
                | ReconcileOutcome::RepeatedOffline
                | ReconcileOutcome::NotInGroup
        )
    }
}

/// Removes a user from their group once their status turns offline, keeps
/// the group administered, and deletes the group when it is left empty.
pub struct GroupReconciler {
    store: Arc<dyn GroupStore>,
    policy: ReconcilerPolicy,
}

impl GroupReconciler {
    pub fn new(store: Arc<dyn GroupStore>, policy: ReconcilerPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &ReconcilerPolicy {
        &self.policy
    }

    /// Runs one status update through a single unit of work. No-op outcomes
    /// are never committed.
    pub async fn handle(&self, user_id: &str, change: &StatusChange) -> SyncResult<ReconcileOutcome> {
        validate_user_id(user_id)?;

        let mut txn = self.store.begin().await?;
        let outcome = self.reconcile(txn.as_mut(), user_id, change).await?;
        if !outcome.is_noop() {
            txn.commit().await?;
        }
        Ok(outcome)
    }

    async fn reconcile(
        &self,
        txn: &mut dyn GroupTxn,
        user_id: &str,
        change: &StatusChange,
    ) -> SyncResult<ReconcileOutcome> {
        let Some(profile) = txn.user_profile(user_id).await? else {
            debug!(user_id, "No profile for status update");
            return Ok(ReconcileOutcome::NoProfile);
        };

        if !change.after.state.is_offline() {
            debug!(user_id, state = ?change.after.state, "Not an offline transition");
            return Ok(ReconcileOutcome::NotOffline);
        }

        if self.policy.skip_repeated_offline
            && change.before.as_ref().is_some_and(|b| b.state.is_offline())
        {
            debug!(user_id, "Already offline before this update");
            return Ok(ReconcileOutcome::RepeatedOffline);
        }

        let Some(group_id) = profile.group_id else {
            debug!(user_id, "User is not in a group");
            return Ok(ReconcileOutcome::NotInGroup);
        };

        info!(user_id, username = %profile.username, group_id = %group_id, "Removing offline user from group");

        // Every step below is safe to repeat. The profile keeps its group
        // until the last step, so a delivery that fails anywhere earlier is
        // picked up again by the redelivery.
        let participant_removed = if txn.has_participant(&group_id, user_id).await? {
            if !txn.release_seat(&group_id, user_id).await? {
                warn!(user_id, group_id = %group_id, "Seat already released, counter untouched");
            }
            txn.remove_participant(&group_id, user_id).await?
        } else {
            debug!(user_id, group_id = %group_id, "Participant already removed");
            false
        };
        txn.clear_departure(&group_id, user_id).await?;

        txn.clear_muted_users(user_id).await?;

        let current_admin = txn.group_admin(&group_id).await?;
        let remaining = txn.list_participants(&group_id).await?;
        debug!(group_id = %group_id, remaining = remaining.len(), "Participants left");

        if remaining.is_empty() {
            info!(group_id = %group_id, "Group is empty, deleting");
            let teardown =
                teardown::delete_group(txn, &group_id, self.policy.teardown_batch_size).await?;
            txn.clear_user_group(user_id).await?;
            return Ok(ReconcileOutcome::GroupDeleted {
                group_id,
                participant_removed,
                teardown,
            });
        }

        let admin = match current_admin {
            None => AdminChange::NoAdmin,
            Some(current) => {
                match admin::successor(self.policy.admin_policy, &current, user_id, &remaining) {
                    Some(next) => {
                        info!(group_id = %group_id, from = %current.user_id, to = %next, "Setting new admin");
                        if txn.set_group_admin(&group_id, &next).await? {
                            AdminChange::Reassigned {
                                from: current.user_id,
                                to: next,
                            }
                        } else {
                            warn!(group_id = %group_id, "Group deleted before the new admin was set");
                            AdminChange::GroupGone
                        }
                    }
                    None => AdminChange::Kept {
                        user_id: current.user_id,
                    },
                }
            }
        };

        txn.clear_user_group(user_id).await?;

        Ok(ReconcileOutcome::LeftGroup {
            group_id,
            participant_removed,
            remaining: remaining.len(),
            admin,
        })
    }
}
