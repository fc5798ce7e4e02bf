use serde::Serialize;
use tracing::{debug, info, warn};

use crate::store::{ChildCollection, GroupDocument, GroupTxn, StoreResult};

/// Deleted before the child collections, in this order.
const GROUP_DOCUMENTS: [GroupDocument; 6] = [
    GroupDocument::Group,
    GroupDocument::Controls,
    GroupDocument::Settings,
    GroupDocument::Time,
    GroupDocument::Admin,
    GroupDocument::ParticipantList,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    /// Documents that existed and were deleted.
    pub documents: Vec<GroupDocument>,
    pub messages: usize,
    pub kicked_users: usize,
}

/// Deletes a group and everything that only exists because of it.
///
/// Missing documents are skipped. Children are removed `batch_size` at a time
/// until none are left, so a teardown cut short resumes where it stopped.
pub async fn delete_group(
    txn: &mut dyn GroupTxn,
    group_id: &str,
    batch_size: usize,
) -> StoreResult<TeardownReport> {
    let mut report = TeardownReport::default();

    for document in GROUP_DOCUMENTS {
        info!(group_id, ?document, "Deleting group document");
        if txn.delete_group_document(document, group_id).await? {
            report.documents.push(document);
        }
    }

    for kind in [ChildCollection::Messages, ChildCollection::KickedUsers] {
        let deleted = delete_children(txn, kind, group_id, batch_size).await?;
        match kind {
            ChildCollection::Messages => report.messages = deleted,
            ChildCollection::KickedUsers => report.kicked_users = deleted,
        }

        let container = kind.container();
        info!(group_id, document = ?container, "Deleting group document");
        if txn.delete_group_document(container, group_id).await? {
            report.documents.push(container);
        }
    }

    Ok(report)
}

async fn delete_children(
    txn: &mut dyn GroupTxn,
    kind: ChildCollection,
    group_id: &str,
    batch_size: usize,
) -> StoreResult<usize> {
    let batch_size = batch_size.max(1);
    let mut deleted = 0;

    loop {
        let keys = txn.list_children(kind, group_id, batch_size).await?;
        if keys.is_empty() {
            break;
        }

        let mut progressed = false;
        for key in &keys {
            if txn.delete_child(kind, group_id, key).await? {
                deleted += 1;
                progressed = true;
            }
        }

        if !progressed {
            warn!(group_id, ?kind, remaining = keys.len(), "Children listed but not deleted");
            break;
        }
        if keys.len() < batch_size {
            break;
        }
    }

    debug!(group_id, ?kind, deleted, "Child collection cleared");
    Ok(deleted)
}
