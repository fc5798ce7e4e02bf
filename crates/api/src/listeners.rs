//! Background subscriptions that feed the sync pipeline from the storage
//! substrates: Redis pub/sub for presence writes and a MongoDB change stream
//! for status updates.

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use mongodb::{
    Database,
    change_stream::event::{ChangeStreamEvent, OperationType},
    options::{FullDocumentBeforeChangeType, FullDocumentType},
};
use pomo_db::models::StatusDocument;
use pomo_services::sync::{
    GroupReconciler, PresenceChange, PresenceMirror, StatusChange, StatusSnapshot,
};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

/// Message published on the presence channel after each presence write.
#[derive(Debug, Deserialize)]
pub struct PresenceMessage {
    pub uid: String,
    #[serde(flatten)]
    pub change: PresenceChange,
}

/// Subscribes to `channel` and runs every presence message through the
/// mirror in its own task.
pub async fn listen_presence(
    redis_url: String,
    channel: String,
    mirror: Arc<PresenceMirror>,
) -> redis::RedisResult<()> {
    let client = redis::Client::open(redis_url)?;
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(&channel).await?;
    info!(%channel, "Listening for presence changes");

    let mut messages = pubsub.on_message();
    while let Some(msg) = messages.next().await {
        let payload: String = match msg.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Unreadable presence message");
                continue;
            }
        };
        let message: PresenceMessage = match serde_json::from_str(&payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, %payload, "Malformed presence message");
                continue;
            }
        };

        let mirror = Arc::clone(&mirror);
        tokio::spawn(async move {
            match mirror.handle(&message.uid, &message.change).await {
                Ok(outcome) => debug!(uid = %message.uid, ?outcome, "Presence change handled"),
                Err(e) => error!(uid = %message.uid, error = %e, "Presence mirror failed"),
            }
        });
    }

    warn!(%channel, "Presence subscription closed");
    Ok(())
}

/// Watches the status collection and hands every update to the reconciler.
pub async fn watch_status(
    db: Database,
    reconciler: Arc<GroupReconciler>,
) -> mongodb::error::Result<()> {
    let mut stream = db
        .collection::<StatusDocument>(StatusDocument::COLLECTION)
        .watch()
        .full_document(FullDocumentType::UpdateLookup)
        .full_document_before_change(FullDocumentBeforeChangeType::WhenAvailable)
        .await?;
    info!(collection = StatusDocument::COLLECTION, "Watching status changes");

    while let Some(event) = stream.try_next().await? {
        let Some((user_id, change)) = status_change(&event) else {
            continue;
        };

        let reconciler = Arc::clone(&reconciler);
        tokio::spawn(async move {
            match reconciler.handle(&user_id, &change).await {
                Ok(outcome) => debug!(%user_id, ?outcome, "Status change handled"),
                Err(e) => error!(%user_id, error = %e, "Group reconciliation failed"),
            }
        });
    }

    warn!("Status change stream closed");
    Ok(())
}

/// Only updates of existing status documents reach the reconciler.
fn status_change(event: &ChangeStreamEvent<StatusDocument>) -> Option<(String, StatusChange)> {
    if !matches!(event.operation_type, OperationType::Update | OperationType::Replace) {
        return None;
    }
    let Some(after) = event.full_document.as_ref() else {
        debug!("Status document gone before lookup");
        return None;
    };
    let change = StatusChange {
        before: event
            .full_document_before_change
            .as_ref()
            .map(StatusSnapshot::from),
        after: StatusSnapshot::from(after),
    };
    Some((after.user_id.clone(), change))
}
