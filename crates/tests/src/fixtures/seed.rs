use pomo_db::models::UserProfile;
use pomo_services::sync::StatusChange;

use super::test_app::TestApp;

/// A group seeded with its admin first in `members`.
pub struct SeededGroup {
    pub group_id: String,
    pub admin: String,
    pub members: Vec<String>,
}

impl TestApp {
    pub async fn seed_user(&self, user_id: &str) -> UserProfile {
        let profile = UserProfile::new(user_id, user_id, format!("{user_id}@pomo.test"));
        self.store.insert_user(profile.clone()).await;
        profile
    }

    /// Creates users `members` and a group administered by the first one.
    pub async fn seed_group(&self, prefix: &str, members: &[&str]) -> SeededGroup {
        let group_id = format!("{prefix}-{}", uuid::Uuid::new_v4().simple());
        for member in members {
            self.seed_user(member).await;
        }

        let (admin, rest) = members.split_first().expect("group needs at least one member");
        self.store.create_group(&group_id, prefix, admin).await;
        for member in rest {
            self.store.join_group(&group_id, member).await;
        }

        SeededGroup {
            group_id,
            admin: admin.to_string(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Runs `user_id` through the reconciler as going offline.
    pub async fn go_offline(&self, user_id: &str) -> pomo_services::sync::ReconcileOutcome {
        self.reconciler()
            .handle(user_id, &StatusChange::offline())
            .await
            .expect("reconcile failed")
    }
}
