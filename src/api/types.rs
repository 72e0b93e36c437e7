use serde::Serialize;

use super::flash::Notice;
use crate::db::Contestant;
use crate::services::Dashboard;

/// JSON error envelope for failures that cannot redirect.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub error: String,
}

impl ApiResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Every GET page: the notices drained from the session plus the page data.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub notices: Vec<Notice>,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub title: &'static str,
    pub username: Option<String>,
    pub admin: Option<String>,
}

/// Describes a form so a client knows where to post and which fields to send.
#[derive(Debug, Serialize)]
pub struct FormPage {
    pub action: &'static str,
    pub fields: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct ContestantDto {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub votes: i32,
}

impl From<Contestant> for ContestantDto {
    fn from(c: Contestant) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            votes: c.votes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContestantsPage {
    pub username: String,
    pub has_voted: bool,
    pub contestants: Vec<ContestantDto>,
}

#[derive(Debug, Serialize)]
pub struct VoteOutcomePage {
    pub username: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub admin: String,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub uptime_seconds: u64,
}
