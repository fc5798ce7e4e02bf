//! Departures over a store without transactions, where each write commits
//! on its own and a failed delivery leaves its earlier writes behind.

use std::sync::Arc;

use futures::future::join_all;
use pomo_services::sync::{
    AdminChange, GroupReconciler, ReconcileOutcome, ReconcilerPolicy, StatusChange,
};

use crate::fixtures::{auto_commit::AutoCommitStore, test_app::TestApp};

fn reconciler(app: &TestApp, store: &AutoCommitStore) -> Arc<GroupReconciler> {
    Arc::new(GroupReconciler::new(
        Arc::new(store.clone()),
        ReconcilerPolicy::from(&app.settings.reconciler),
    ))
}

#[tokio::test]
async fn interrupted_teardown_is_finished_by_redelivery() {
    let app = TestApp::spawn().await;
    let store = AutoCommitStore::new(app.store.clone());
    let reconciler = reconciler(&app, &store);
    let group = app.seed_group("focus", &["a"]).await;
    for i in 0..5 {
        app.store
            .add_message(&group.group_id, "a", &format!("m{i}"))
            .await;
    }

    app.store.fail_after("delete_child", 2);
    let result = reconciler.handle("a", &StatusChange::offline()).await;
    assert!(result.is_err());

    let state = app.store.snapshot().await;
    assert_eq!(state.group_records(&group.group_id), 5);
    assert_eq!(state.users["a"].group_id.as_deref(), Some(group.group_id.as_str()));

    let outcome = tokio_test::assert_ok!(reconciler.handle("a", &StatusChange::offline()).await);
    let ReconcileOutcome::GroupDeleted {
        participant_removed,
        teardown,
        ..
    } = outcome
    else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert!(!participant_removed);
    assert_eq!(teardown.messages, 3);

    let state = app.store.snapshot().await;
    assert_eq!(state.group_records(&group.group_id), 0);
    assert_eq!(state.users["a"].group_id, None);
}

#[tokio::test]
async fn counter_settles_after_failure_past_removal() {
    let app = TestApp::spawn().await;
    let store = AutoCommitStore::new(app.store.clone());
    let reconciler = reconciler(&app, &store);
    let group = app.seed_group("focus", &["a", "b", "c"]).await;

    app.store.fail_next("clear_user_group");
    let result = reconciler.handle("c", &StatusChange::offline()).await;
    assert!(result.is_err());

    let state = app.store.snapshot().await;
    assert_eq!(state.groups[&group.group_id].participants_count, 2);
    assert_eq!(state.participants_of(&group.group_id).len(), 2);
    assert_eq!(state.users["c"].group_id.as_deref(), Some(group.group_id.as_str()));

    let outcome = tokio_test::assert_ok!(reconciler.handle("c", &StatusChange::offline()).await);
    assert_eq!(
        outcome,
        ReconcileOutcome::LeftGroup {
            group_id: group.group_id.clone(),
            participant_removed: false,
            remaining: 2,
            admin: AdminChange::Kept {
                user_id: "a".to_string()
            },
        }
    );

    let state = app.store.snapshot().await;
    assert_eq!(state.groups[&group.group_id].participants_count, 2);
    assert_eq!(state.users["c"].group_id, None);
}

#[tokio::test]
async fn seat_is_released_once_when_removal_fails() {
    let app = TestApp::spawn().await;
    let store = AutoCommitStore::new(app.store.clone());
    let reconciler = reconciler(&app, &store);
    let group = app.seed_group("focus", &["a", "b", "c"]).await;

    app.store.fail_next("remove_participant");
    let result = reconciler.handle("c", &StatusChange::offline()).await;
    assert!(result.is_err());

    let state = app.store.snapshot().await;
    let stored = &state.groups[&group.group_id];
    assert_eq!(stored.participants_count, 2);
    assert_eq!(stored.departing_user_ids, vec!["c".to_string()]);
    assert_eq!(state.participants_of(&group.group_id).len(), 3);

    let outcome = tokio_test::assert_ok!(reconciler.handle("c", &StatusChange::offline()).await);
    let ReconcileOutcome::LeftGroup {
        participant_removed,
        remaining,
        ..
    } = outcome
    else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert!(participant_removed);
    assert_eq!(remaining, 2);

    let state = app.store.snapshot().await;
    let stored = &state.groups[&group.group_id];
    assert_eq!(stored.participants_count, 2);
    assert!(stored.departing_user_ids.is_empty());
    assert_eq!(state.users["c"].group_id, None);
}

#[tokio::test]
async fn admin_is_not_recreated_for_a_group_deleted_meanwhile() {
    let app = TestApp::spawn().await;
    let store = AutoCommitStore::new(app.store.clone());
    let reconciler = reconciler(&app, &store);
    let group = app.seed_group("focus", &["a", "b"]).await;

    // "b" leaves and tears the group down while "a" is picking a successor
    let other = Arc::clone(&reconciler);
    store
        .after_next_listing(async move {
            let outcome = other
                .handle("b", &StatusChange::offline())
                .await
                .expect("reconcile failed");
            assert!(matches!(outcome, ReconcileOutcome::GroupDeleted { .. }));
        })
        .await;

    let outcome = tokio_test::assert_ok!(reconciler.handle("a", &StatusChange::offline()).await);
    let ReconcileOutcome::LeftGroup { admin, .. } = outcome else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(admin, AdminChange::GroupGone);

    let state = app.store.snapshot().await;
    assert!(!state.admins.contains_key(&group.group_id));
    assert_eq!(state.group_records(&group.group_id), 0);
    assert_eq!(state.users["a"].group_id, None);
    assert_eq!(state.users["b"].group_id, None);
}

#[tokio::test]
async fn interleaved_departures_leave_nothing_behind() {
    let app = TestApp::spawn().await;
    let store = AutoCommitStore::new(app.store.clone());
    let reconciler = reconciler(&app, &store);
    let group = app.seed_group("focus", &["a", "b", "c", "d"]).await;
    app.store.add_message(&group.group_id, "a", "hello").await;
    app.store.kick(&group.group_id, "z").await;

    let change = StatusChange::offline();
    let outcomes = join_all(
        group
            .members
            .iter()
            .map(|member| reconciler.handle(member, &change)),
    )
    .await;

    let deleted = outcomes
        .into_iter()
        .map(|o| tokio_test::assert_ok!(o))
        .filter(|o| matches!(o, ReconcileOutcome::GroupDeleted { .. }))
        .count();
    assert!(deleted >= 1);

    let state = app.store.snapshot().await;
    assert_eq!(state.group_records(&group.group_id), 0);
    for member in &group.members {
        assert_eq!(state.users[member].group_id, None);
    }
}
