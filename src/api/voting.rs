use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::flash::{self, Level};
use super::gate;
use super::validation::validate_contestant_id;
use super::{
    ApiError, AppState, ContestantDto, ContestantsPage, HomePage, Page, VoteOutcomePage,
};
use crate::domain::UserContext;
use crate::services::VoteError;

const DB_UNAVAILABLE: &str = "Database connection error.";

/// GET /
pub async fn home(session: Session) -> Result<Json<Page<HomePage>>, ApiError> {
    let username = gate::user_context(&session).await?.map(|u| u.username);
    let admin = gate::admin_context(&session).await?.map(|a| a.username);

    Ok(Json(Page {
        notices: flash::take(&session).await?,
        data: HomePage {
            title: "Online Voting System",
            username,
            admin,
        },
    }))
}

/// GET /contestants
pub async fn contestants(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    session: Session,
) -> Result<Response, ApiError> {
    let voting = state.voting_service();
    let listing = match voting.list_contestants().await {
        Ok(list) => list,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list contestants");
            flash::push(&session, Level::Danger, DB_UNAVAILABLE).await?;
            return Ok(Redirect::to("/").into_response());
        }
    };

    // A deleted account still holding a session simply shows as not voted
    let has_voted = match voting.has_voted(user.user_id).await {
        Ok(has_voted) => has_voted,
        Err(VoteError::UserNotFound(_)) => false,
        Err(e) => {
            tracing::error!(
                error = %e,
                user_id = user.user_id.value(),
                "Failed to read vote status"
            );
            flash::push(&session, Level::Danger, DB_UNAVAILABLE).await?;
            return Ok(Redirect::to("/").into_response());
        }
    };

    Ok(Json(Page {
        notices: flash::take(&session).await?,
        data: ContestantsPage {
            username: user.username,
            has_voted,
            contestants: listing.into_iter().map(ContestantDto::from).collect(),
        },
    })
    .into_response())
}

/// GET /about/{id}
pub async fn about(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response, ApiError> {
    let back = Redirect::to("/contestants").into_response();

    let id = match validate_contestant_id(id) {
        Ok(id) => id,
        Err(message) => {
            flash::push(&session, Level::Danger, message).await?;
            return Ok(back);
        }
    };

    match state.voting_service().contestant(id).await {
        Ok(contestant) => Ok(Json(Page {
            notices: flash::take(&session).await?,
            data: ContestantDto::from(contestant),
        })
        .into_response()),
        Err(VoteError::ContestantNotFound(_)) => {
            flash::push(&session, Level::Danger, "Contestant not found.").await?;
            Ok(back)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load contestant");
            flash::push(&session, Level::Danger, DB_UNAVAILABLE).await?;
            Ok(back)
        }
    }
}

/// GET /vote/{id}
pub async fn vote(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<UserContext>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Redirect, ApiError> {
    let contestant = match validate_contestant_id(id) {
        Ok(id) => id,
        Err(message) => {
            flash::push(&session, Level::Danger, message).await?;
            return Ok(Redirect::to("/contestants"));
        }
    };

    match state
        .voting_service()
        .cast_vote(user.user_id, contestant)
        .await
    {
        Ok(_) => Ok(Redirect::to("/vote_success")),
        Err(VoteError::AlreadyVoted) => Ok(Redirect::to("/vote_fail")),
        Err(VoteError::UserNotFound(_)) => {
            session.flush().await?;
            flash::push(
                &session,
                Level::Danger,
                "User not found. Please login again.",
            )
            .await?;
            Ok(Redirect::to("/login"))
        }
        Err(VoteError::ContestantNotFound(_)) => {
            flash::push(&session, Level::Danger, "Contestant not found.").await?;
            Ok(Redirect::to("/contestants"))
        }
        Err(VoteError::Database(_)) => {
            flash::push(&session, Level::Danger, DB_UNAVAILABLE).await?;
            Ok(Redirect::to("/contestants"))
        }
    }
}

/// GET /vote_success
pub async fn vote_success(
    Extension(user): Extension<UserContext>,
    session: Session,
) -> Result<Json<Page<VoteOutcomePage>>, ApiError> {
    Ok(Json(Page {
        notices: flash::take(&session).await?,
        data: VoteOutcomePage {
            username: user.username,
            message: "Thank you! Your vote has been recorded.",
        },
    }))
}

/// GET /vote_fail
pub async fn vote_fail(
    Extension(user): Extension<UserContext>,
    session: Session,
) -> Result<Json<Page<VoteOutcomePage>>, ApiError> {
    Ok(Json(Page {
        notices: flash::take(&session).await?,
        data: VoteOutcomePage {
            username: user.username,
            message: "You have already voted. Each account may vote only once.",
        },
    }))
}
