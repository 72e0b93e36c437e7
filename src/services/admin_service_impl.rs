//! `SeaORM` implementation of the `AdminService` trait.

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::{Contestant, Store};
use crate::domain::{ContestantId, UserId};
use crate::services::admin_service::{
    AdminError, AdminService, AuthenticatedAdmin, BootstrapAdmin, ContestantSummary, Dashboard,
    UserSummary,
};
use crate::services::password::Passwords;

const GENERATED_PASSWORD_LEN: usize = 24;

pub struct SeaOrmAdminService {
    store: Store,
    passwords: Passwords,
}

impl SeaOrmAdminService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self {
            store,
            passwords: Passwords::new(security),
        }
    }

    async fn insert_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedAdmin, AdminError> {
        let password_hash = self
            .passwords
            .hash(password)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))?;

        let admin = self
            .store
            .create_admin(username, &password_hash)
            .await?
            .ok_or_else(|| AdminError::Conflict(format!("Admin '{username}' already exists")))?;

        info!(admin_id = admin.id, "Created admin {}", admin.username);

        Ok(AuthenticatedAdmin {
            admin_id: admin.id,
            username: admin.username,
        })
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedAdmin, AdminError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AdminError::InvalidCredentials);
        }

        let Some((admin, password_hash)) = self.store.get_admin_credentials(username).await?
        else {
            return Err(AdminError::InvalidCredentials);
        };

        let is_valid = self
            .passwords
            .verify(password, &password_hash)
            .await
            .map_err(|e| AdminError::Internal(e.to_string()))?;

        if !is_valid {
            return Err(AdminError::InvalidCredentials);
        }

        Ok(AuthenticatedAdmin {
            admin_id: admin.id,
            username: admin.username,
        })
    }

    async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<BootstrapAdmin, AdminError> {
        if self.store.admin_count().await? > 0 {
            return Ok(BootstrapAdmin::Existing);
        }

        let username = username.trim();
        if username.is_empty() {
            return Err(AdminError::Validation(
                "Bootstrap admin username is empty".to_string(),
            ));
        }

        let generated_password = password.is_empty().then(generate_password);
        let password = generated_password.as_deref().unwrap_or(password);

        let admin = match self.insert_admin(username, password).await {
            Ok(admin) => admin,
            // Another instance bootstrapped the same admin first
            Err(AdminError::Conflict(_)) => return Ok(BootstrapAdmin::Existing),
            Err(e) => return Err(e),
        };

        if let Some(generated) = &generated_password {
            warn!(
                "No admin password configured. Created admin '{}' with password: {}",
                admin.username, generated
            );
        }

        Ok(BootstrapAdmin::Created {
            username: admin.username,
            generated_password,
        })
    }

    async fn create_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedAdmin, AdminError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AdminError::Validation(
                "Username and password are required.".to_string(),
            ));
        }

        self.insert_admin(username, password).await
    }

    async fn add_contestant(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Contestant, AdminError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AdminError::Validation(
                "Contestant name is required.".to_string(),
            ));
        }

        Ok(self.store.add_contestant(name, description.trim()).await?)
    }

    async fn remove_contestant(&self, id: ContestantId) -> Result<bool, AdminError> {
        Ok(self.store.remove_contestant(id.value()).await?)
    }

    async fn toggle_user_block(&self, user: UserId) -> Result<bool, AdminError> {
        self.store
            .toggle_user_blocked(user.value())
            .await?
            .ok_or(AdminError::UserNotFound(user))
    }

    async fn dashboard(&self) -> Result<Dashboard, AdminError> {
        let users = self
            .store
            .list_users_newest_first()
            .await?
            .into_iter()
            .map(|u| UserSummary {
                id: UserId::new(u.id),
                username: u.username,
                email: u.email,
                blocked: u.blocked,
            })
            .collect();

        let contestants = self
            .store
            .list_contestants_newest_first()
            .await?
            .into_iter()
            .map(|c| ContestantSummary {
                id: ContestantId::new(c.id),
                name: c.name,
                votes: c.votes,
            })
            .collect();

        Ok(Dashboard { users, contestants })
    }
}

fn generate_password() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
