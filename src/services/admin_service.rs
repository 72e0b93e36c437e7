//! Domain service for the admin panel.
//!
//! Admin identities live in the `admins` table with Argon2id hashes. The
//! rest of the surface manages contestants and voter access.

use serde::Serialize;
use thiserror::Error;

use crate::db::Contestant;
use crate::domain::{ContestantId, UserId};

/// Errors specific to admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AdminError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub blocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContestantSummary {
    pub id: ContestantId,
    pub name: String,
    pub votes: i32,
}

/// Everything the dashboard shows, newest rows first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub users: Vec<UserSummary>,
    pub contestants: Vec<ContestantSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedAdmin {
    pub admin_id: i32,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapAdmin {
    /// At least one admin already exists; nothing was created.
    Existing,
    /// `generated_password` is set when none was configured.
    Created {
        username: String,
        generated_password: Option<String>,
    },
}

/// Domain service trait for administration.
#[async_trait::async_trait]
pub trait AdminService: Send + Sync {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedAdmin, AdminError>;

    /// Creates the first admin when the table is empty.
    async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<BootstrapAdmin, AdminError>;

    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] on empty fields and
    /// [`AdminError::Conflict`] when the username is taken.
    async fn create_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedAdmin, AdminError>;

    async fn add_contestant(&self, name: &str, description: &str)
    -> Result<Contestant, AdminError>;

    /// Deletes a contestant. Returns `false` if no such contestant existed.
    async fn remove_contestant(&self, id: ContestantId) -> Result<bool, AdminError>;

    /// Flips the user's blocked flag and returns the new value.
    async fn toggle_user_block(&self, user: UserId) -> Result<bool, AdminError>;

    async fn dashboard(&self) -> Result<Dashboard, AdminError>;
}
