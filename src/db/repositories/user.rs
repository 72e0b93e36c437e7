use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::entities::{prelude::*, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_verified: bool,
    pub blocked: bool,
    pub has_voted: bool,
    pub created_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            is_verified: model.is_verified,
            blocked: model.blocked,
            has_voted: model.has_voted,
            created_at: model.created_at,
        }
    }
}

/// Row to insert at signup. The email must already be normalised.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub verification_code: String,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts an unverified user.
    ///
    /// Returns `None` when the username or email is already taken, including
    /// when a concurrent signup won the unique index.
    pub async fn create(&self, new_user: NewUser) -> Result<Option<User>> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            is_verified: Set(false),
            verification_code: Set(Some(new_user.verification_code)),
            verified_with: Set(None),
            blocked: Set(false),
            has_voted: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active.insert(&self.conn).await {
            Ok(model) => {
                info!("Created user {} ({})", model.username, model.id);
                Ok(Some(User::from(model)))
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    pub async fn exists_with_username_or_email(&self, username: &str, email: &str) -> Result<bool> {
        let existing = Users::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(username))
                    .add(users::Column::Email.eq(email)),
            )
            .one(&self.conn)
            .await
            .context("Failed to query existing users")?;

        Ok(existing.is_some())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by email together with the stored password hash
    pub async fn get_credentials_by_email(&self, email: &str) -> Result<Option<(User, String)>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn get_verification_code(&self, id: i32) -> Result<Option<String>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query verification code")?;

        Ok(user.and_then(|u| u.verification_code))
    }

    pub async fn find_by_pending_code(&self, code: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::VerificationCode.eq(code))
            .one(&self.conn)
            .await
            .context("Failed to query user by verification code")?;

        Ok(user.map(User::from))
    }

    pub async fn find_by_consumed_code(&self, code: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::VerifiedWith.eq(code))
            .one(&self.conn)
            .await
            .context("Failed to query user by consumed verification code")?;

        Ok(user.map(User::from))
    }

    /// Consumes a pending verification code.
    ///
    /// Returns `false` if the user was already verified, so two racing
    /// verifications transition the row only once.
    pub async fn mark_verified(&self, id: i32, code: &str) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = Users::update_many()
            .col_expr(users::Column::IsVerified, Expr::value(true))
            .col_expr(
                users::Column::VerificationCode,
                Expr::value(Option::<String>::None),
            )
            .col_expr(users::Column::VerifiedWith, Expr::value(code))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::IsVerified.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to mark user verified")?;

        Ok(result.rows_affected > 0)
    }

    /// Flips the blocked flag and returns the new state, or `None` if the
    /// user does not exist.
    ///
    /// The flip is done by the `UPDATE` itself and the new value is read
    /// back inside the same transaction.
    pub async fn toggle_blocked(&self, id: i32) -> Result<Option<bool>> {
        let txn = self.conn.begin().await?;
        let now = chrono::Utc::now().to_rfc3339();

        let result = Users::update_many()
            .col_expr(
                users::Column::Blocked,
                Expr::col(users::Column::Blocked).not(),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id))
            .exec(&txn)
            .await
            .context("Failed to toggle blocked flag")?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        let Some(user) = Users::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        txn.commit().await?;

        info!("User {} ({}) blocked={}", user.username, id, user.blocked);
        Ok(Some(user.blocked))
    }

    pub async fn list_newest_first(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_desc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}

/// Generate a random verification token (32 alphanumeric characters)
#[must_use]
pub fn generate_verification_code() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    rand::rng()
        .sample_iter(Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_code_is_32_alphanumeric_chars() {
        let code = generate_verification_code();
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn verification_codes_differ() {
        assert_ne!(generate_verification_code(), generate_verification_code());
    }
}
