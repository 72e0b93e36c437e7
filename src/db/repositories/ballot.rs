//! The vote transaction.
//!
//! Claiming the vote and incrementing the tally happen inside one
//! transaction. The claim is a conditional update on `has_voted = false`, so
//! whichever of two racing transactions writes the row first wins and the
//! other observes zero affected rows. No read-then-write window exists on the
//! user row.

use crate::entities::{contestants, prelude::*, users};
use anyhow::Result;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, IsolationLevel,
    PaginatorTrait, QueryFilter, TransactionTrait, sea_query::Expr,
};
use tracing::debug;

/// Result of a ballot attempt. Every variant other than `Counted` leaves the
/// store untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotOutcome {
    /// The vote was recorded; `votes` is the contestant's new tally.
    Counted { votes: i32 },
    AlreadyVoted,
    UnknownUser,
    UnknownContestant,
}

pub struct BallotRepository {
    conn: DatabaseConnection,
}

impl BallotRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn cast(&self, user_id: i32, contestant_id: i32) -> Result<BallotOutcome> {
        // SQLite serialises writers on its own and rejects isolation levels.
        let isolation = match self.conn.get_database_backend() {
            DbBackend::Sqlite => None,
            _ => Some(IsolationLevel::Serializable),
        };

        let txn = self.conn.begin_with_config(isolation, None).await?;

        let now = chrono::Utc::now().to_rfc3339();
        let claimed = Users::update_many()
            .col_expr(users::Column::HasVoted, Expr::value(true))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(user_id))
            .filter(users::Column::HasVoted.eq(false))
            .exec(&txn)
            .await?;

        if claimed.rows_affected == 0 {
            let user_exists = Users::find_by_id(user_id).count(&txn).await? > 0;
            txn.rollback().await?;

            debug!(user_id, contestant_id, user_exists, "Ballot rejected");
            return Ok(if user_exists {
                BallotOutcome::AlreadyVoted
            } else {
                BallotOutcome::UnknownUser
            });
        }

        let tallied = Contestants::update_many()
            .col_expr(
                contestants::Column::Votes,
                Expr::col(contestants::Column::Votes).add(1),
            )
            .filter(contestants::Column::Id.eq(contestant_id))
            .exec(&txn)
            .await?;

        if tallied.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(BallotOutcome::UnknownContestant);
        }

        let votes = Contestants::find_by_id(contestant_id)
            .one(&txn)
            .await?
            .map_or(0, |c| c.votes);

        txn.commit().await?;

        Ok(BallotOutcome::Counted { votes })
    }
}
