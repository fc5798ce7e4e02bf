use pomo_services::store::{GroupDocument, GroupStore};
use pomo_services::sync::{ReconcileOutcome, ReconcilerPolicy, StatusChange};

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn deletes_every_group_record() {
    let app = TestApp::spawn().await;
    let group = app.seed_group("study", &["a"]).await;
    for i in 0..250 {
        app.store
            .add_message(&group.group_id, "a", &format!("message {i}"))
            .await;
    }
    for kicked in ["x", "y", "z"] {
        app.store.kick(&group.group_id, kicked).await;
    }

    let outcome = app.go_offline("a").await;

    let ReconcileOutcome::GroupDeleted { teardown, .. } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(teardown.messages, 250);
    assert_eq!(teardown.kicked_users, 3);
    assert_eq!(
        teardown.documents,
        vec![
            GroupDocument::Group,
            GroupDocument::Controls,
            GroupDocument::Settings,
            GroupDocument::Time,
            GroupDocument::Admin,
            GroupDocument::ParticipantList,
            GroupDocument::MessageBoard,
            GroupDocument::KickedList,
        ]
    );
    assert_eq!(app.store.snapshot().await.group_records(&group.group_id), 0);
}

#[tokio::test]
async fn small_batches_clear_all_children() {
    let app = TestApp::spawn().await;
    let group = app.seed_group("study", &["a"]).await;
    for i in 0..20 {
        app.store
            .add_message(&group.group_id, "a", &format!("message {i}"))
            .await;
    }
    let reconciler = app.reconciler_with(ReconcilerPolicy {
        teardown_batch_size: 7,
        ..ReconcilerPolicy::default()
    });

    let outcome = reconciler
        .handle("a", &StatusChange::offline())
        .await
        .unwrap();

    let ReconcileOutcome::GroupDeleted { teardown, .. } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(teardown.messages, 20);
    assert_eq!(app.store.snapshot().await.group_records(&group.group_id), 0);
}

#[tokio::test]
async fn other_groups_are_untouched() {
    let app = TestApp::spawn().await;
    let doomed = app.seed_group("doomed", &["a"]).await;
    let kept = app.seed_group("kept", &["b", "c"]).await;
    app.store.add_message(&doomed.group_id, "a", "bye").await;
    app.store.add_message(&kept.group_id, "b", "hi").await;
    app.store.kick(&kept.group_id, "z").await;
    let before = app.store.snapshot().await.group_records(&kept.group_id);

    app.go_offline("a").await;

    let state = app.store.snapshot().await;
    assert_eq!(state.group_records(&doomed.group_id), 0);
    assert_eq!(state.group_records(&kept.group_id), before);
}

#[tokio::test]
async fn missing_satellites_are_skipped() {
    let app = TestApp::spawn().await;
    let group = app.seed_group("study", &["a"]).await;
    {
        let mut txn = app.store.begin().await.unwrap();
        for document in [GroupDocument::Settings, GroupDocument::KickedList] {
            txn.delete_group_document(document, &group.group_id)
                .await
                .unwrap();
        }
        txn.commit().await.unwrap();
    }

    let outcome = app.go_offline("a").await;

    let ReconcileOutcome::GroupDeleted { teardown, .. } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(teardown.documents.len(), 6);
    assert!(!teardown.documents.contains(&GroupDocument::Settings));
    assert_eq!(app.store.snapshot().await.group_records(&group.group_id), 0);
}
