use axum::{
    Router, middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{Config, MIN_SESSION_SECRET_LEN};
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
pub mod flash;
pub mod gate;
mod observability;
mod system;
mod types;
mod validation;
mod voting;

pub use error::ApiError;
pub use flash::{Level, Notice};
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub session_key: Key,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<Config> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn identity_service(&self) -> &Arc<dyn crate::services::IdentityService> {
        &self.shared.identity_service
    }

    #[must_use]
    pub fn voting_service(&self) -> &Arc<dyn crate::services::VotingService> {
        &self.shared.voting_service
    }

    #[must_use]
    pub fn admin_service(&self) -> &Arc<dyn crate::services::AdminService> {
        &self.shared.admin_service
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let session_key = session_key(&shared.config.session.secret)?;

    Ok(Arc::new(AppState {
        shared,
        session_key,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle)
}

/// Cookie signing key. An empty secret yields a fresh random key.
fn session_key(secret: &str) -> anyhow::Result<Key> {
    if secret.is_empty() {
        tracing::warn!("No session secret configured; sessions will not survive a restart");
        return Ok(Key::generate());
    }

    Key::try_from(secret.as_bytes()).map_err(|_| {
        anyhow::anyhow!("Session secret must be at least {MIN_SESSION_SECRET_LEN} bytes")
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_signed(state.session_key.clone())
        .with_secure(server.secure_cookies)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    Router::new()
        .merge(public_routes())
        .merge(voter_routes())
        .merge(admin_routes())
        .layer(session_layer)
        .route("/health", get(system::health))
        .with_state(state)
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(voting::home))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/verify_email/{code}", get(auth::verify_email))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/admin/login", get(admin::login_page).post(admin::login))
}

fn voter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contestants", get(voting::contestants))
        .route("/about/{id}", get(voting::about))
        .route("/vote/{id}", get(voting::vote))
        .route("/vote_success", get(voting::vote_success))
        .route("/vote_fail", get(voting::vote_fail))
        .route_layer(middleware::from_fn(gate::require_user))
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/logout", get(admin::logout))
        .route("/admin/dashboard", get(admin::dashboard))
        .route(
            "/admin/add_contestant",
            get(admin::add_contestant_page).post(admin::add_contestant),
        )
        .route(
            "/admin/delete_contestant/{id}",
            post(admin::delete_contestant),
        )
        .route(
            "/admin/toggle_user_block/{id}",
            post(admin::toggle_user_block),
        )
        .route("/admin/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn(gate::require_admin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_generates_key() {
        assert!(session_key("").is_ok());
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(session_key("too-short").is_err());
    }

    #[test]
    fn long_secret_is_accepted() {
        let secret = "k".repeat(MIN_SESSION_SECRET_LEN);
        assert!(session_key(&secret).is_ok());
    }
}
