//! One-shot notices carried in the session across a redirect.
//!
//! Handlers push a notice before redirecting; the next page that renders
//! drains them.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::ApiError;

const NOTICES_KEY: &str = "_notices";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

pub async fn push(
    session: &Session,
    level: Level,
    message: impl Into<String>,
) -> Result<(), ApiError> {
    let mut notices: Vec<Notice> = session.get(NOTICES_KEY).await?.unwrap_or_default();
    notices.push(Notice::new(level, message));
    session.insert(NOTICES_KEY, notices).await?;
    Ok(())
}

/// Removes and returns every pending notice, oldest first.
pub async fn take(session: &Session) -> Result<Vec<Notice>, ApiError> {
    Ok(session
        .remove::<Vec<Notice>>(NOTICES_KEY)
        .await?
        .unwrap_or_default())
}
