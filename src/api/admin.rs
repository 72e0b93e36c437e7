use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::flash::{self, Level};
use super::gate::{ADMIN_ID_KEY, ADMIN_USERNAME_KEY};
use super::validation::{validate_contestant_id, validate_field_length, validate_user_id};
use super::{ApiError, AppState, DashboardPage, FormPage, Page};
use crate::domain::AdminContext;
use crate::services::AdminError;

const DB_UNAVAILABLE: &str = "Database connection error.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminLoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContestantForm {
    pub name: String,
    pub description: String,
}

/// GET /admin/login
pub async fn login_page(session: Session) -> Result<Json<Page<FormPage>>, ApiError> {
    Ok(Json(Page {
        notices: flash::take(&session).await?,
        data: FormPage {
            action: "/admin/login",
            fields: &["username", "password"],
        },
    }))
}

/// POST /admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<AdminLoginForm>,
) -> Result<Redirect, ApiError> {
    match state
        .admin_service()
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(admin) => {
            session.cycle_id().await?;
            session.insert(ADMIN_ID_KEY, admin.admin_id).await?;
            session.insert(ADMIN_USERNAME_KEY, &admin.username).await?;

            tracing::info!(admin = %admin.username, "Admin logged in");
            flash::push(&session, Level::Success, "Admin logged in successfully.").await?;
            Ok(Redirect::to("/admin/dashboard"))
        }
        Err(AdminError::InvalidCredentials) => {
            tracing::warn!(username = %form.username, "Rejected admin login");
            flash::push(&session, Level::Danger, "Invalid admin credentials.").await?;
            Ok(Redirect::to("/admin/login"))
        }
        Err(e) => {
            tracing::error!(error = %e, "Admin login failed");
            flash::push(&session, Level::Danger, DB_UNAVAILABLE).await?;
            Ok(Redirect::to("/admin/login"))
        }
    }
}

/// GET /admin/logout
/// Ends the admin login only; a voter login in the same session survives
pub async fn logout(session: Session) -> Result<Redirect, ApiError> {
    session.remove::<i32>(ADMIN_ID_KEY).await?;
    session.remove::<String>(ADMIN_USERNAME_KEY).await?;
    flash::push(&session, Level::Info, "Admin logged out.").await?;
    Ok(Redirect::to("/admin/login"))
}

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminContext>,
    session: Session,
) -> Result<Response, ApiError> {
    let dashboard = match state.admin_service().dashboard().await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load dashboard");
            flash::push(&session, Level::Danger, DB_UNAVAILABLE).await?;
            return Ok(Redirect::to("/admin/login").into_response());
        }
    };

    Ok(Json(Page {
        notices: flash::take(&session).await?,
        data: DashboardPage {
            admin: admin.username,
            dashboard,
        },
    })
    .into_response())
}

/// GET /admin/add_contestant
pub async fn add_contestant_page(session: Session) -> Result<Json<Page<FormPage>>, ApiError> {
    Ok(Json(Page {
        notices: flash::take(&session).await?,
        data: FormPage {
            action: "/admin/add_contestant",
            fields: &["name", "description"],
        },
    }))
}

/// POST /admin/add_contestant
pub async fn add_contestant(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<ContestantForm>,
) -> Result<Redirect, ApiError> {
    let back = Redirect::to("/admin/add_contestant");

    if let Err(message) = validate_field_length("Name", form.name.trim()) {
        flash::push(&session, Level::Danger, message).await?;
        return Ok(back);
    }

    match state
        .admin_service()
        .add_contestant(&form.name, &form.description)
        .await
    {
        Ok(contestant) => {
            flash::push(
                &session,
                Level::Success,
                format!("Contestant '{}' added successfully.", contestant.name),
            )
            .await?;
            Ok(Redirect::to("/admin/dashboard"))
        }
        Err(AdminError::Validation(message)) => {
            flash::push(&session, Level::Danger, message).await?;
            Ok(back)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to add contestant");
            flash::push(&session, Level::Danger, DB_UNAVAILABLE).await?;
            Ok(back)
        }
    }
}

/// POST /admin/delete_contestant/{id}
pub async fn delete_contestant(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Redirect, ApiError> {
    let (level, message) = match validate_contestant_id(id) {
        Err(message) => (Level::Danger, message),
        Ok(id) => match state.admin_service().remove_contestant(id).await {
            // Deleting an absent contestant is not an error
            Ok(_) => (
                Level::Success,
                "Contestant deleted successfully.".to_string(),
            ),
            Err(e) => {
                tracing::error!(error = %e, "Failed to delete contestant");
                (Level::Danger, DB_UNAVAILABLE.to_string())
            }
        },
    };

    flash::push(&session, level, message).await?;
    Ok(Redirect::to("/admin/dashboard"))
}

/// POST /admin/toggle_user_block/{id}
pub async fn toggle_user_block(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Redirect, ApiError> {
    let (level, message) = match validate_user_id(id) {
        Err(message) => (Level::Danger, message),
        Ok(user_id) => match state.admin_service().toggle_user_block(user_id).await {
            Ok(true) => (Level::Success, "User blocked successfully.".to_string()),
            Ok(false) => (Level::Success, "User unblocked successfully.".to_string()),
            Err(AdminError::UserNotFound(_)) => (Level::Danger, "User not found.".to_string()),
            Err(e) => {
                tracing::error!(error = %e, "Failed to toggle user block");
                (Level::Danger, DB_UNAVAILABLE.to_string())
            }
        },
    };

    flash::push(&session, level, message).await?;
    Ok(Redirect::to("/admin/dashboard"))
}
