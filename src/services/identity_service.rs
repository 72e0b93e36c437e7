//! Domain service for voter identity.
//!
//! Handles signup, email verification, and password authentication. Session
//! issuance stays in the HTTP layer, which receives the authenticated
//! identity from here.

use serde::Serialize;
use thiserror::Error;

use crate::domain::UserId;

/// Errors specific to identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is blocked")]
    AccountBlocked,

    #[error("Email address not verified")]
    NotVerified,

    #[error("Invalid or expired verification code")]
    InvalidToken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for IdentityError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for IdentityError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Signup form input, as submitted.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Outcome of the verification mail attempt. A failed send never undoes
/// the registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MailDelivery {
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Registered {
    pub user_id: UserId,
    pub username: String,
    pub mail: MailDelivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verification {
    Verified,
    AlreadyVerified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub username: String,
}

/// Domain service trait for voter identity.
#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// Creates an unverified account and sends the verification mail.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Validation`] for missing or mismatched fields and
    /// [`IdentityError::Conflict`] when the username or email is taken.
    async fn register(&self, registration: Registration) -> Result<Registered, IdentityError>;

    /// Consumes a verification code. Repeating a consumed code reports
    /// [`Verification::AlreadyVerified`].
    async fn verify(&self, code: &str) -> Result<Verification, IdentityError>;

    /// Checks email and password, then the account state.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCredentials`], [`IdentityError::AccountBlocked`]
    /// or [`IdentityError::NotVerified`], in that order of precedence.
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, IdentityError>;
}

/// Emails compare case-insensitively; they are stored in this form.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn anyhow_errors_map_to_database() {
        let err: IdentityError = anyhow::anyhow!("pool timed out").into();
        assert!(matches!(err, IdentityError::Database(_)));
    }
}
