//! `SeaORM` implementation of the `IdentityService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{NewUser, Store};
use crate::db::repositories::user::generate_verification_code;
use crate::domain::UserId;
use crate::services::identity_service::{
    AuthenticatedUser, IdentityError, IdentityService, MailDelivery, Registered, Registration,
    Verification, normalize_email,
};
use crate::services::mailer::{Mailer, verification_mail};
use crate::services::password::Passwords;

const DUPLICATE_USER: &str = "User with this email or username already exists.";

pub struct SeaOrmIdentityService {
    store: Store,
    passwords: Passwords,
    mailer: Arc<dyn Mailer>,
    config: Arc<Config>,
}

impl SeaOrmIdentityService {
    #[must_use]
    pub fn new(store: Store, mailer: Arc<dyn Mailer>, config: Arc<Config>) -> Self {
        Self {
            store,
            passwords: Passwords::new(config.security.clone()),
            mailer,
            config,
        }
    }
}

#[async_trait]
impl IdentityService for SeaOrmIdentityService {
    async fn register(&self, registration: Registration) -> Result<Registered, IdentityError> {
        let username = registration.username.trim();
        let email = normalize_email(&registration.email);

        if username.is_empty()
            || email.is_empty()
            || registration.password.is_empty()
            || registration.confirm_password.is_empty()
        {
            return Err(IdentityError::Validation(
                "All fields are required.".to_string(),
            ));
        }

        if registration.password != registration.confirm_password {
            return Err(IdentityError::Validation(
                "Passwords do not match.".to_string(),
            ));
        }

        if self.store.user_exists(username, &email).await? {
            return Err(IdentityError::Conflict(DUPLICATE_USER.to_string()));
        }

        let password_hash = self
            .passwords
            .hash(&registration.password)
            .await
            .map_err(|e| IdentityError::Internal(e.to_string()))?;

        let code = generate_verification_code();

        // The unique indexes catch a signup that raced past the check above
        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                email,
                password_hash,
                verification_code: code.clone(),
            })
            .await?
            .ok_or_else(|| IdentityError::Conflict(DUPLICATE_USER.to_string()))?;

        metrics::counter!("registrations_total").increment(1);

        let link = self.config.verification_link(&code);
        let mail = verification_mail(&user.username, &user.email, &link);

        let delivery = match self.mailer.send(&mail).await {
            Ok(()) => {
                info!(user_id = user.id, "Verification mail sent");
                MailDelivery::Sent
            }
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Failed to send verification mail");
                MailDelivery::Failed(e.to_string())
            }
        };

        Ok(Registered {
            user_id: UserId::new(user.id),
            username: user.username,
            mail: delivery,
        })
    }

    async fn verify(&self, code: &str) -> Result<Verification, IdentityError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(IdentityError::InvalidToken);
        }

        if let Some(user) = self.store.find_user_by_pending_code(code).await? {
            if user.is_verified {
                return Ok(Verification::AlreadyVerified);
            }

            // A concurrent verification may have consumed the code first
            return if self.store.mark_user_verified(user.id, code).await? {
                info!(user_id = user.id, "Email verified");
                Ok(Verification::Verified)
            } else {
                Ok(Verification::AlreadyVerified)
            };
        }

        if self.store.find_user_by_consumed_code(code).await?.is_some() {
            return Ok(Verification::AlreadyVerified);
        }

        Err(IdentityError::InvalidToken)
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, IdentityError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(IdentityError::Validation(
                "Email and password are required.".to_string(),
            ));
        }

        let result = self.check_credentials(&email, password).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(IdentityError::InvalidCredentials) => "invalid_credentials",
            Err(IdentityError::AccountBlocked) => "blocked",
            Err(IdentityError::NotVerified) => "not_verified",
            Err(_) => "error",
        };
        metrics::counter!("logins_total", "outcome" => outcome).increment(1);

        result
    }
}

impl SeaOrmIdentityService {
    async fn check_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, IdentityError> {
        let Some((user, password_hash)) = self.store.get_user_credentials(email).await? else {
            return Err(IdentityError::InvalidCredentials);
        };

        let is_valid = self
            .passwords
            .verify(password, &password_hash)
            .await
            .map_err(|e| IdentityError::Internal(e.to_string()))?;

        if !is_valid {
            return Err(IdentityError::InvalidCredentials);
        }

        if user.blocked {
            return Err(IdentityError::AccountBlocked);
        }

        if !user.is_verified {
            return Err(IdentityError::NotVerified);
        }

        Ok(AuthenticatedUser {
            user_id: UserId::new(user.id),
            username: user.username,
        })
    }
}
