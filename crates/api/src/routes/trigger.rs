use axum::{
    Json,
    extract::{Path, State},
};
use pomo_db::models::PresenceRecord;
use pomo_services::sync::{
    MirrorOutcome, PresenceChange, ReconcileOutcome, StatusChange, events::validate_user_id,
};
use serde::Serialize;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct MirrorResponse {
    pub outcome: MirrorOutcome,
}

pub async fn presence(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(change): Json<PresenceChange>,
) -> Result<Json<MirrorResponse>, ApiError> {
    let outcome = state.mirror.handle(&uid, &change).await?;
    Ok(Json(MirrorResponse { outcome }))
}

pub async fn status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Result<Json<ReconcileOutcome>, ApiError> {
    let outcome = state.reconciler.handle(&user_id, &change).await?;
    Ok(Json(outcome))
}

/// Writes a presence record and fires the mirror for it, the way the
/// presence substrate does for external writers.
pub async fn set_presence(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(record): Json<PresenceRecord>,
) -> Result<Json<MirrorResponse>, ApiError> {
    validate_user_id(&uid)?;
    let change = PresenceChange {
        before: state.presence.get(&uid).await?,
        after: record,
    };
    change.validate()?;
    state.presence.set(&uid, &change.after).await?;

    let outcome = state.mirror.handle(&uid, &change).await?;
    Ok(Json(MirrorResponse { outcome }))
}
