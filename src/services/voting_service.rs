//! Domain service for casting and reading votes.

use serde::Serialize;
use thiserror::Error;

use crate::db::Contestant;
use crate::domain::{ContestantId, UserId};

/// Errors specific to voting operations.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("You have already voted")]
    AlreadyVoted,

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Contestant not found: {0}")]
    ContestantNotFound(ContestantId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for VoteError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for VoteError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

impl VoteError {
    /// Label used for the `votes_rejected_total` metric.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::AlreadyVoted => "already_voted",
            Self::UserNotFound(_) => "unknown_user",
            Self::ContestantNotFound(_) => "unknown_contestant",
            Self::Database(_) => "database",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub contestant_id: ContestantId,
    /// Tally after this vote was counted.
    pub votes: i32,
}

/// Domain service trait for voting.
#[async_trait::async_trait]
pub trait VotingService: Send + Sync {
    /// Records one vote for `contestant` on behalf of `user`.
    ///
    /// Claiming the user's single vote and incrementing the tally are one
    /// atomic unit; any error leaves both untouched.
    ///
    /// # Errors
    ///
    /// Returns [`VoteError::AlreadyVoted`] if the user has voted before, and
    /// the not-found variants when either row is missing.
    async fn cast_vote(
        &self,
        user: UserId,
        contestant: ContestantId,
    ) -> Result<VoteReceipt, VoteError>;

    /// All contestants in insertion order.
    async fn list_contestants(&self) -> Result<Vec<Contestant>, VoteError>;

    async fn contestant(&self, id: ContestantId) -> Result<Contestant, VoteError>;

    async fn has_voted(&self, user: UserId) -> Result<bool, VoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_reasons_are_distinct() {
        let reasons = [
            VoteError::AlreadyVoted.reason(),
            VoteError::UserNotFound(UserId::new(1)).reason(),
            VoteError::ContestantNotFound(ContestantId::new(1)).reason(),
            VoteError::Database(String::new()).reason(),
        ];
        for (i, a) in reasons.iter().enumerate() {
            for b in &reasons[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
