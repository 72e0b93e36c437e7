mod common;

use ballotbox::domain::{ContestantId, UserId};
use ballotbox::services::VoteError;
use common::spawn_state;

#[tokio::test]
async fn second_vote_is_rejected_and_tally_unchanged() {
    let ctx = spawn_state().await;
    let user = ctx.verified_user("alice", "a@x.com", "pw").await;
    let contestant = ctx
        .shared
        .admin_service
        .add_contestant("Contestant A", "first")
        .await
        .unwrap();
    let contestant_id = ContestantId::new(contestant.id);
    let voting = &ctx.shared.voting_service;

    let receipt = voting.cast_vote(user, contestant_id).await.unwrap();
    assert_eq!(receipt.votes, 1);
    assert!(voting.has_voted(user).await.unwrap());

    let err = voting.cast_vote(user, contestant_id).await.unwrap_err();
    assert!(matches!(err, VoteError::AlreadyVoted));

    assert_eq!(voting.contestant(contestant_id).await.unwrap().votes, 1);
}

#[tokio::test]
async fn concurrent_votes_by_one_user_count_once() {
    let ctx = spawn_state().await;
    let user = ctx.verified_user("bob", "b@x.com", "pw").await;
    let contestant = ctx
        .shared
        .admin_service
        .add_contestant("Contestant B", "")
        .await
        .unwrap();
    let contestant_id = ContestantId::new(contestant.id);

    let attempts = (0..8).map(|_| {
        let voting = ctx.shared.voting_service.clone();
        tokio::spawn(async move { voting.cast_vote(user, contestant_id).await })
    });

    let results: Vec<_> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let counted = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(VoteError::AlreadyVoted)))
        .count();
    assert_eq!(counted, 1);
    assert_eq!(rejected, results.len() - 1);

    let tally = ctx
        .shared
        .voting_service
        .contestant(contestant_id)
        .await
        .unwrap()
        .votes;
    assert_eq!(tally, 1);
}

#[tokio::test]
async fn concurrent_votes_by_different_users_all_count() {
    let ctx = spawn_state().await;
    let contestant = ctx
        .shared
        .admin_service
        .add_contestant("Popular", "")
        .await
        .unwrap();
    let contestant_id = ContestantId::new(contestant.id);

    let mut users = Vec::new();
    for i in 0..5 {
        users.push(
            ctx.verified_user(&format!("voter{i}"), &format!("v{i}@x.com"), "pw")
                .await,
        );
    }

    let attempts = users.into_iter().map(|user| {
        let voting = ctx.shared.voting_service.clone();
        tokio::spawn(async move { voting.cast_vote(user, contestant_id).await })
    });

    for joined in futures::future::join_all(attempts).await {
        assert!(joined.unwrap().is_ok());
    }

    let tally = ctx
        .shared
        .voting_service
        .contestant(contestant_id)
        .await
        .unwrap()
        .votes;
    assert_eq!(tally, 5);
}

#[tokio::test]
async fn vote_for_missing_contestant_changes_nothing() {
    let ctx = spawn_state().await;
    let user = ctx.verified_user("carol", "c@x.com", "pw").await;
    let voting = &ctx.shared.voting_service;

    let err = voting
        .cast_vote(user, ContestantId::new(9999))
        .await
        .unwrap_err();
    assert!(matches!(err, VoteError::ContestantNotFound(id) if id.value() == 9999));

    // The claim on the user row was rolled back
    assert!(!voting.has_voted(user).await.unwrap());
}

#[tokio::test]
async fn vote_by_missing_user_is_rejected() {
    let ctx = spawn_state().await;
    let contestant = ctx
        .shared
        .admin_service
        .add_contestant("Lonely", "")
        .await
        .unwrap();
    let voting = &ctx.shared.voting_service;

    let err = voting
        .cast_vote(UserId::new(4242), ContestantId::new(contestant.id))
        .await
        .unwrap_err();
    assert!(matches!(err, VoteError::UserNotFound(_)));
    assert_eq!(
        voting
            .contestant(ContestantId::new(contestant.id))
            .await
            .unwrap()
            .votes,
        0
    );
}

#[tokio::test]
async fn contestants_are_listed_in_insertion_order() {
    let ctx = spawn_state().await;
    let admin = &ctx.shared.admin_service;
    for name in ["First", "Second", "Third"] {
        admin.add_contestant(name, "").await.unwrap();
    }

    let names: Vec<_> = ctx
        .shared
        .voting_service
        .list_contestants()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["First", "Second", "Third"]);
}

#[tokio::test]
async fn missing_contestant_lookup_is_not_found() {
    let ctx = spawn_state().await;
    let err = ctx
        .shared
        .voting_service
        .contestant(ContestantId::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, VoteError::ContestantNotFound(_)));
}
