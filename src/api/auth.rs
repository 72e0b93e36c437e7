use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::flash::{self, Level};
use super::gate::{USER_ID_KEY, USERNAME_KEY};
use super::validation::validate_field_length;
use super::{ApiError, AppState, FormPage, Page};
use crate::services::{IdentityError, MailDelivery, Registration, Verification};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

const DB_UNAVAILABLE: &str = "Database connection error.";

// ============================================================================
// Handlers
// ============================================================================

/// GET /signup
pub async fn signup_page(session: Session) -> Result<Json<Page<FormPage>>, ApiError> {
    Ok(Json(Page {
        notices: flash::take(&session).await?,
        data: FormPage {
            action: "/signup",
            fields: &["username", "email", "password", "confirm_password"],
        },
    }))
}

/// POST /signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Redirect, ApiError> {
    let back = Redirect::to("/signup");

    for (label, value) in [("Username", &form.username), ("Email", &form.email)] {
        if let Err(message) = validate_field_length(label, value.trim()) {
            flash::push(&session, Level::Danger, message).await?;
            return Ok(back);
        }
    }

    let registration = Registration {
        username: form.username,
        email: form.email,
        password: form.password,
        confirm_password: form.confirm_password,
    };

    match state.identity_service().register(registration).await {
        Ok(registered) => {
            match registered.mail {
                MailDelivery::Sent => {
                    flash::push(
                        &session,
                        Level::Success,
                        "Verification email sent. Please check your inbox.",
                    )
                    .await?;
                }
                MailDelivery::Failed(_) => {
                    flash::push(
                        &session,
                        Level::Danger,
                        "Failed to send verification email. Contact admin.",
                    )
                    .await?;
                }
            }
            Ok(Redirect::to("/login"))
        }
        Err(IdentityError::Validation(message) | IdentityError::Conflict(message)) => {
            flash::push(&session, Level::Danger, message).await?;
            Ok(back)
        }
        Err(e) => {
            tracing::error!(error = %e, "Signup failed");
            flash::push(&session, Level::Danger, DB_UNAVAILABLE).await?;
            Ok(back)
        }
    }
}

/// GET /verify_email/{code}
pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(code): Path<String>,
) -> Result<Redirect, ApiError> {
    let (level, message) = match state.identity_service().verify(&code).await {
        Ok(Verification::Verified) => (
            Level::Success,
            "Email verified successfully! You can now login.",
        ),
        Ok(Verification::AlreadyVerified) => {
            (Level::Info, "Email already verified. Please login.")
        }
        Err(IdentityError::InvalidToken) => {
            (Level::Danger, "Invalid or expired verification link.")
        }
        Err(e) => {
            tracing::error!(error = %e, "Email verification failed");
            (Level::Danger, DB_UNAVAILABLE)
        }
    };

    flash::push(&session, level, message).await?;
    Ok(Redirect::to("/login"))
}

/// GET /login
pub async fn login_page(session: Session) -> Result<Json<Page<FormPage>>, ApiError> {
    Ok(Json(Page {
        notices: flash::take(&session).await?,
        data: FormPage {
            action: "/login",
            fields: &["email", "password"],
        },
    }))
}

/// POST /login
/// Authenticates a voter and starts a fresh session on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, ApiError> {
    let user = match state
        .identity_service()
        .authenticate(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            let (level, message) = match &e {
                IdentityError::Validation(_) => {
                    (Level::Danger, "Email and password are required.")
                }
                IdentityError::InvalidCredentials => (Level::Danger, "Invalid email or password."),
                IdentityError::AccountBlocked => {
                    (Level::Danger, "Your account is blocked. Contact admin.")
                }
                IdentityError::NotVerified => (
                    Level::Warning,
                    "Email not verified. Please check your inbox.",
                ),
                _ => {
                    tracing::error!(error = %e, "Login failed");
                    (Level::Danger, DB_UNAVAILABLE)
                }
            };
            flash::push(&session, level, message).await?;
            return Ok(Redirect::to("/login"));
        }
    };

    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.user_id.value()).await?;
    session.insert(USERNAME_KEY, &user.username).await?;

    tracing::info!(user_id = %user.user_id, "User logged in");

    flash::push(
        &session,
        Level::Success,
        format!("Welcome back, {}!", user.username),
    )
    .await?;
    Ok(Redirect::to("/contestants"))
}

/// GET /logout
/// Clears the whole session, including any admin login
pub async fn logout(session: Session) -> Result<Redirect, ApiError> {
    session.flush().await?;
    flash::push(&session, Level::Info, "You have been logged out.").await?;
    Ok(Redirect::to("/"))
}
