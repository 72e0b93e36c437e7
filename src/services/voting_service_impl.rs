//! `SeaORM` implementation of the `VotingService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::db::{BallotOutcome, Contestant, Store};
use crate::domain::{ContestantId, UserId};
use crate::services::voting_service::{VoteError, VoteReceipt, VotingService};

pub struct SeaOrmVotingService {
    store: Store,
}

impl SeaOrmVotingService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl VotingService for SeaOrmVotingService {
    async fn cast_vote(
        &self,
        user: UserId,
        contestant: ContestantId,
    ) -> Result<VoteReceipt, VoteError> {
        let outcome = self
            .store
            .cast_ballot(user.value(), contestant.value())
            .await
            .map_err(VoteError::from);

        let result = match outcome {
            Ok(BallotOutcome::Counted { votes }) => Ok(VoteReceipt {
                contestant_id: contestant,
                votes,
            }),
            Ok(BallotOutcome::AlreadyVoted) => Err(VoteError::AlreadyVoted),
            Ok(BallotOutcome::UnknownUser) => Err(VoteError::UserNotFound(user)),
            Ok(BallotOutcome::UnknownContestant) => Err(VoteError::ContestantNotFound(contestant)),
            Err(e) => Err(e),
        };

        match &result {
            Ok(receipt) => {
                metrics::counter!("votes_cast_total").increment(1);
                info!(
                    user_id = %user,
                    contestant_id = %contestant,
                    votes = receipt.votes,
                    "Vote counted"
                );
            }
            Err(e) => {
                metrics::counter!("votes_rejected_total", "reason" => e.reason()).increment(1);
                if matches!(e, VoteError::Database(_)) {
                    warn!(user_id = %user, contestant_id = %contestant, error = %e, "Vote failed");
                }
            }
        }

        result
    }

    async fn list_contestants(&self) -> Result<Vec<Contestant>, VoteError> {
        Ok(self.store.list_contestants().await?)
    }

    async fn contestant(&self, id: ContestantId) -> Result<Contestant, VoteError> {
        self.store
            .get_contestant(id.value())
            .await?
            .ok_or(VoteError::ContestantNotFound(id))
    }

    async fn has_voted(&self, user: UserId) -> Result<bool, VoteError> {
        self.store
            .get_user(user.value())
            .await?
            .map(|u| u.has_voted)
            .ok_or(VoteError::UserNotFound(user))
    }
}
