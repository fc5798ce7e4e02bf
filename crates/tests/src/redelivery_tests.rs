use futures::future::join_all;
use pomo_services::store::GroupStore;
use pomo_services::sync::{ReconcileOutcome, StatusChange, SyncError};

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn failed_departure_leaves_no_partial_writes() {
    let app = TestApp::spawn().await;
    let group = app.seed_group("focus", &["a", "b", "c"]).await;
    let before = app.store.snapshot().await;

    app.store.fail_next("set_group_admin");
    let result = app
        .reconciler()
        .handle("a", &StatusChange::offline())
        .await;
    assert!(matches!(result, Err(SyncError::Store(_))));

    let after = app.store.snapshot().await;
    assert_eq!(app.store.writes(), 0);
    assert_eq!(
        after.groups[&group.group_id].participants_count,
        before.groups[&group.group_id].participants_count
    );
    assert!(after.participants.contains_key(&(group.group_id.clone(), "a".to_string())));
    assert_eq!(after.users["a"].group_id.as_deref(), Some(group.group_id.as_str()));

    // Redelivery completes the departure exactly once
    let outcome = app.go_offline("a").await;
    assert!(matches!(outcome, ReconcileOutcome::LeftGroup { .. }));
    let state = app.store.snapshot().await;
    assert_eq!(state.groups[&group.group_id].participants_count, 2);
    assert_ne!(state.admins[&group.group_id].user_id, "a");
}

#[tokio::test]
async fn failed_teardown_is_retried_in_full() {
    let app = TestApp::spawn().await;
    let group = app.seed_group("focus", &["a"]).await;
    for i in 0..5 {
        app.store
            .add_message(&group.group_id, "a", &format!("m{i}"))
            .await;
    }
    let records = app.store.snapshot().await.group_records(&group.group_id);

    app.store.fail_next("delete_child");
    let result = app
        .reconciler()
        .handle("a", &StatusChange::offline())
        .await;
    assert!(result.is_err());
    assert_eq!(app.store.snapshot().await.group_records(&group.group_id), records);

    let outcome = app.go_offline("a").await;
    assert!(matches!(outcome, ReconcileOutcome::GroupDeleted { .. }));
    assert_eq!(app.store.snapshot().await.group_records(&group.group_id), 0);
}

#[tokio::test]
async fn commit_failure_discards_everything() {
    let app = TestApp::spawn().await;
    let group = app.seed_group("focus", &["a", "b"]).await;

    app.store.fail_next("commit");
    let result = app
        .reconciler()
        .handle("b", &StatusChange::offline())
        .await;
    assert!(result.is_err());

    let state = app.store.snapshot().await;
    assert_eq!(state.groups[&group.group_id].participants_count, 2);
    assert_eq!(state.users["b"].group_id.as_deref(), Some(group.group_id.as_str()));
}

#[tokio::test]
async fn duplicate_delivery_is_a_noop() {
    let app = TestApp::spawn().await;
    let group = app.seed_group("focus", &["a", "b"]).await;

    app.go_offline("b").await;
    let writes = app.store.writes();
    let outcome = app.go_offline("b").await;

    assert_eq!(outcome, ReconcileOutcome::NotInGroup);
    assert_eq!(app.store.writes(), writes);
    let state = app.store.snapshot().await;
    assert_eq!(state.groups[&group.group_id].participants_count, 1);
}

#[tokio::test]
async fn counter_untouched_when_participant_already_gone() {
    let app = TestApp::spawn().await;
    let group = app.seed_group("focus", &["a", "b", "c"]).await;
    {
        let mut txn = app.store.begin().await.unwrap();
        assert!(txn.remove_participant(&group.group_id, "c").await.unwrap());
        txn.commit().await.unwrap();
    }

    let outcome = app.go_offline("c").await;

    let ReconcileOutcome::LeftGroup {
        participant_removed,
        remaining,
        ..
    } = outcome
    else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert!(!participant_removed);
    assert_eq!(remaining, 2);
    let state = app.store.snapshot().await;
    assert_eq!(state.groups[&group.group_id].participants_count, 3);
    assert_eq!(state.users["c"].group_id, None);
}

#[tokio::test]
async fn concurrent_departures_converge() {
    let app = TestApp::spawn().await;
    let group = app.seed_group("focus", &["a", "b", "c", "d"]).await;

    let change = StatusChange::offline();
    let outcomes = join_all(
        group
            .members
            .iter()
            .map(|member| app.reconciler().handle(member, &change)),
    )
    .await;

    let outcomes: Vec<ReconcileOutcome> = outcomes
        .into_iter()
        .map(|o| tokio_test::assert_ok!(o))
        .collect();
    let deleted = outcomes
        .iter()
        .filter(|o| matches!(o, ReconcileOutcome::GroupDeleted { .. }))
        .count();
    assert_eq!(deleted, 1);
    assert_eq!(app.store.snapshot().await.group_records(&group.group_id), 0);
}
