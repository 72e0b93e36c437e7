//! Session gate for voter and admin routes.
//!
//! The middleware resolves the session into an explicit context and stores it
//! in the request extensions. Handlers take it with `Extension<UserContext>`
//! or `Extension<AdminContext>`.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use super::ApiError;
use super::flash::{self, Level};
use crate::domain::{AdminContext, UserContext, UserId};

pub const USER_ID_KEY: &str = "user_id";
pub const USERNAME_KEY: &str = "username";
pub const ADMIN_ID_KEY: &str = "admin_id";
pub const ADMIN_USERNAME_KEY: &str = "admin_username";

pub async fn user_context(session: &Session) -> Result<Option<UserContext>, ApiError> {
    let user_id = session.get::<i32>(USER_ID_KEY).await?;
    let username = session.get::<String>(USERNAME_KEY).await?;

    Ok(user_id.zip(username).map(|(id, username)| UserContext {
        user_id: UserId::new(id),
        username,
    }))
}

pub async fn admin_context(session: &Session) -> Result<Option<AdminContext>, ApiError> {
    let admin_id = session.get::<i32>(ADMIN_ID_KEY).await?;
    let username = session.get::<String>(ADMIN_USERNAME_KEY).await?;

    Ok(admin_id
        .zip(username)
        .map(|(admin_id, username)| AdminContext { admin_id, username }))
}

pub async fn require_user(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(context) = user_context(&session).await? else {
        flash::push(&session, Level::Warning, "Login required!").await?;
        return Ok(Redirect::to("/login").into_response());
    };

    tracing::Span::current().record("user_id", context.user_id.value());
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

pub async fn require_admin(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(context) = admin_context(&session).await? else {
        flash::push(&session, Level::Warning, "Admin login required.").await?;
        return Ok(Redirect::to("/admin/login").into_response());
    };

    tracing::Span::current().record("admin", context.username.as_str());
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}
