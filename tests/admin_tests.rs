mod common;

use ballotbox::domain::{ContestantId, UserId};
use ballotbox::services::{AdminError, BootstrapAdmin};
use common::spawn_state;

#[tokio::test]
async fn toggle_twice_restores_original_state() {
    let ctx = spawn_state().await;
    let user = ctx.verified_user("alice", "a@x.com", "pw").await;
    let admin = &ctx.shared.admin_service;

    assert!(admin.toggle_user_block(user).await.unwrap());
    assert!(!admin.toggle_user_block(user).await.unwrap());

    let stored = ctx.shared.store.get_user(user.value()).await.unwrap().unwrap();
    assert!(!stored.blocked);
}

#[tokio::test]
async fn toggle_reports_the_stored_state() {
    let ctx = spawn_state().await;
    let user = ctx.verified_user("dora", "d@x.com", "pw").await;

    for _ in 0..3 {
        let reported = ctx.shared.admin_service.toggle_user_block(user).await.unwrap();
        let stored = ctx.shared.store.get_user(user.value()).await.unwrap().unwrap();
        assert_eq!(reported, stored.blocked);
    }
}

#[tokio::test]
async fn concurrent_toggles_each_flip_once() {
    let ctx = spawn_state().await;
    let user = ctx.verified_user("erin", "e@x.com", "pw").await;

    let toggles = (0..6).map(|_| {
        let admin = ctx.shared.admin_service.clone();
        tokio::spawn(async move { admin.toggle_user_block(user).await })
    });

    let states: Vec<bool> = futures::future::join_all(toggles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(states.iter().filter(|blocked| **blocked).count(), 3);
    assert_eq!(states.iter().filter(|blocked| !**blocked).count(), 3);

    let stored = ctx.shared.store.get_user(user.value()).await.unwrap().unwrap();
    assert!(!stored.blocked);
}

#[tokio::test]
async fn toggle_missing_user_is_not_found() {
    let ctx = spawn_state().await;
    let err = ctx
        .shared
        .admin_service
        .toggle_user_block(UserId::new(77))
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::UserNotFound(id) if id.value() == 77));
}

#[tokio::test]
async fn remove_contestant_is_idempotent() {
    let ctx = spawn_state().await;
    let admin = &ctx.shared.admin_service;
    let contestant = admin.add_contestant("Gone Soon", "").await.unwrap();
    let id = ContestantId::new(contestant.id);

    assert!(admin.remove_contestant(id).await.unwrap());
    assert!(!admin.remove_contestant(id).await.unwrap());
}

#[tokio::test]
async fn contestant_name_is_required() {
    let ctx = spawn_state().await;
    let err = ctx
        .shared
        .admin_service
        .add_contestant("   ", "no name")
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::Validation(ref m) if m == "Contestant name is required."));
}

#[tokio::test]
async fn new_contestant_starts_at_zero_votes() {
    let ctx = spawn_state().await;
    let contestant = ctx
        .shared
        .admin_service
        .add_contestant("  Fresh  ", "desc")
        .await
        .unwrap();
    assert_eq!(contestant.name, "Fresh");
    assert_eq!(contestant.votes, 0);
}

#[tokio::test]
async fn dashboard_lists_newest_first() {
    let ctx = spawn_state().await;
    ctx.verified_user("old", "old@x.com", "pw").await;
    ctx.verified_user("new", "new@x.com", "pw").await;

    let admin = &ctx.shared.admin_service;
    admin.add_contestant("Early", "").await.unwrap();
    admin.add_contestant("Late", "").await.unwrap();

    let dashboard = admin.dashboard().await.unwrap();
    let users: Vec<_> = dashboard.users.iter().map(|u| u.username.as_str()).collect();
    let contestants: Vec<_> = dashboard
        .contestants
        .iter()
        .map(|c| c.name.as_str())
        .collect();

    assert_eq!(users, ["new", "old"]);
    assert_eq!(contestants, ["Late", "Early"]);
}

#[tokio::test]
async fn bootstrap_creates_admin_once() {
    let ctx = spawn_state().await;
    let admin = &ctx.shared.admin_service;

    let first = admin.ensure_bootstrap_admin("root", "").await.unwrap();
    let BootstrapAdmin::Created {
        username,
        generated_password: Some(password),
    } = first.clone()
    else {
        panic!("expected a created admin with a generated password, got {first:?}");
    };
    assert_eq!(username, "root");

    let authenticated = admin.authenticate("root", &password).await.unwrap();
    assert_eq!(authenticated.username, "root");

    let second = admin.ensure_bootstrap_admin("root", "other").await.unwrap();
    assert_eq!(second, BootstrapAdmin::Existing);
}

#[tokio::test]
async fn admin_authentication_checks_stored_hash() {
    let ctx = spawn_state().await;
    ctx.bootstrap_admin().await;
    let admin = &ctx.shared.admin_service;

    assert!(admin.authenticate("admin", "admin-password").await.is_ok());
    assert!(matches!(
        admin.authenticate("admin", "admin").await,
        Err(AdminError::InvalidCredentials)
    ));
    assert!(matches!(
        admin.authenticate("ghost", "admin-password").await,
        Err(AdminError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn create_admin_rejects_duplicates_and_empty_fields() {
    let ctx = spawn_state().await;
    let admin = &ctx.shared.admin_service;

    admin.create_admin("ops", "pw").await.unwrap();
    assert!(matches!(
        admin.create_admin("ops", "pw2").await,
        Err(AdminError::Conflict(_))
    ));
    assert!(matches!(
        admin.create_admin("", "pw").await,
        Err(AdminError::Validation(_))
    ));
}
