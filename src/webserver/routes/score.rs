/// Score submission and per-user query routes
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::webserver::{
    state::AppState,
    utils::{error_response, success_response},
};

/// Default action label echoed back on accepted submissions
const DEFAULT_ACTION: &str = "complete_task";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdateRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// Create score routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/score", post(update_score))
        .route("/user/:user_id/score", get(get_user_score))
        .route("/user/:user_id/rate-limit", get(get_rate_limit_status))
}

/// POST /api/user/score
async fn update_score(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoreUpdateRequest>,
) -> Response {
    let (user_id, username) = match (
        request.user_id.filter(|s| !s.is_empty()),
        request.username.filter(|s| !s.is_empty()),
    ) {
        (Some(user_id), Some(username)) => (user_id, username),
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Missing required fields: userId, username",
                None,
            );
        }
    };

    let result = match state.coordinator.submit(&user_id, &username).await {
        Ok(result) => result,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update user score",
                Some(e.to_string()),
            );
        }
    };

    if !result.accepted {
        // 429 carries the rate-limit info alongside the error envelope
        let body = serde_json::json!({
            "success": false,
            "error": "Rate limit exceeded. Too many score update attempts.",
            "rateLimitInfo": {
                "remainingActions": result.rate_limit.remaining_points,
                "resetTime": result.rate_limit.reset_time,
            },
        });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    success_response(serde_json::json!({
        "userScore": result.user_score,
        "action": request.action.unwrap_or_else(|| DEFAULT_ACTION.to_string()),
        "rateLimitInfo": {
            "remainingActions": result.rate_limit.remaining_points,
            "resetTime": result.rate_limit.reset_time,
        },
    }))
}

/// GET /api/user/:user_id/score
async fn get_user_score(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Response {
    match state.store.get_user(&user_id).await {
        Ok(Some(entry)) => success_response(entry),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "User not found in leaderboard", None),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to fetch user score",
            Some(e.to_string()),
        ),
    }
}

/// GET /api/user/:user_id/rate-limit
async fn get_rate_limit_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Response {
    let status = state.limiter.status(&user_id).await;
    success_response(status)
}
