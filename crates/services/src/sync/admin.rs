use pomo_config::AdminPolicy;
use pomo_db::models::{GroupAdmin, Participant};
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AdminChange {
    NoAdmin,
    Kept { user_id: String },
    Reassigned { from: String, to: String },
    /// A concurrent departure deleted the group before the new admin was
    /// written.
    GroupGone,
}

/// Decides who administers the group after `departing` left. `None` keeps
/// `current`.
pub fn successor(
    policy: AdminPolicy,
    current: &GroupAdmin,
    departing: &str,
    remaining: &[Participant],
) -> Option<String> {
    let replace = match policy {
        AdminPolicy::Always => true,
        AdminPolicy::OnAdminDeparture => {
            current.user_id == departing
                || !remaining.iter().any(|p| p.user_id == current.user_id)
        }
    };
    if !replace {
        return None;
    }
    pick_random(remaining).map(|p| p.user_id.clone())
}

/// Uniform pick over `candidates`.
pub fn pick_random(candidates: &[Participant]) -> Option<&Participant> {
    if candidates.is_empty() {
        return None;
    }
    let mut rng = rand::rng();
    candidates.get(rng.random_range(0..candidates.len()))
}
