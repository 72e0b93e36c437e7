#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use ballotbox::config::{Config, SecurityConfig};
use ballotbox::db::User;
use ballotbox::db::repositories::user::UserRepository;
use ballotbox::domain::UserId;
use ballotbox::services::{MailError, Mailer, OutgoingMail, Registration};
use ballotbox::state::SharedState;
use http_body_util::BodyExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Captures outgoing mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Transport("relay unreachable".to_string()));
        }
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

pub fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("ballotbox-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.database.url = format!("sqlite:{}", db_path.display());
    config.server.secure_cookies = false;
    config.server.public_url = "http://voting.test".to_string();
    config.security = SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };
    config.admin.bootstrap_username = "admin".to_string();
    config.admin.bootstrap_password = "admin-password".to_string();
    config
}

pub struct TestContext {
    pub shared: Arc<SharedState>,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn spawn_state() -> TestContext {
    let mailer = Arc::new(RecordingMailer::default());
    let shared = SharedState::with_mailer(test_config(), mailer.clone())
        .await
        .expect("Failed to create shared state");

    TestContext {
        shared: Arc::new(shared),
        mailer,
    }
}

impl TestContext {
    /// Registers and verifies a voter, returning their id.
    pub async fn verified_user(&self, username: &str, email: &str, password: &str) -> UserId {
        let registered = self
            .shared
            .identity_service
            .register(Registration {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                confirm_password: password.to_string(),
            })
            .await
            .expect("registration failed");

        let code = self.pending_code(registered.user_id).await;
        self.shared
            .identity_service
            .verify(&code)
            .await
            .expect("verification failed");

        registered.user_id
    }

    pub async fn pending_code(&self, user_id: UserId) -> String {
        self.stored_code(user_id)
            .await
            .expect("no pending verification code")
    }

    /// The pending verification code as stored, if any.
    pub async fn stored_code(&self, user_id: UserId) -> Option<String> {
        self.users()
            .get_verification_code(user_id.value())
            .await
            .unwrap()
    }

    pub async fn user_named(&self, username: &str) -> Option<User> {
        self.users().get_by_username(username).await.unwrap()
    }

    fn users(&self) -> UserRepository {
        UserRepository::new(self.shared.store.conn.clone())
    }

    pub async fn bootstrap_admin(&self) {
        self.shared
            .admin_service
            .ensure_bootstrap_admin("admin", "admin-password")
            .await
            .expect("bootstrap admin failed");
    }

    pub fn client(&self) -> TestClient {
        let state = ballotbox::api::create_app_state(self.shared.clone(), None)
            .expect("Failed to create app state");
        TestClient {
            app: ballotbox::api::router(state),
            cookie: None,
        }
    }
}

/// Drives the router and carries the session cookie between requests.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn fork(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &[(&str, &str)]) -> Response<Body> {
        let body = form
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// GETs a page and returns its JSON body.
    pub async fn page(&mut self, uri: &str) -> serde_json::Value {
        let response = self.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        json_body(response).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Response<Body> {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    pub async fn admin_login(&mut self) -> Response<Body> {
        self.post_form(
            "/admin/login",
            &[("username", "admin"), ("password", "admin-password")],
        )
        .await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            self.cookie = Some(pair);
        }

        response
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
}

pub fn assert_redirect(response: &Response<Body>, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Messages of the notices on a rendered page.
pub fn notice_messages(page: &serde_json::Value) -> Vec<String> {
    page["notices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["message"].as_str().unwrap().to_string())
        .collect()
}
