/// Leaderboard query and admin routes
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    config,
    events::Event,
    webserver::{
        state::AppState,
        utils::{error_response, success_response},
    },
};

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    /// Number of entries to return (defaults to the configured top count)
    pub count: Option<i64>,
}

/// Create leaderboard routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/leaderboard",
        get(get_leaderboard).delete(clear_leaderboard),
    )
}

/// GET /api/leaderboard
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Response {
    let default_count = config::with_config(|cfg| cfg.leaderboard.top_count);
    let count = params
        .count
        .map(|c| c.max(0) as usize)
        .unwrap_or(default_count);

    let leaderboard = match state.store.top_k(count).await {
        Ok(entries) => entries,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch leaderboard",
                Some(e.to_string()),
            );
        }
    };

    let total_users = match state.store.total_users().await {
        Ok(total) => total,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch leaderboard",
                Some(e.to_string()),
            );
        }
    };

    success_response(serde_json::json!({
        "leaderboard": leaderboard,
        "totalUsers": total_users,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// DELETE /api/leaderboard
async fn clear_leaderboard(State(state): State<Arc<AppState>>) -> Response {
    if let Err(e) = state.store.clear().await {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to clear leaderboard",
            Some(e.to_string()),
        );
    }

    state
        .hub
        .publish(Event::system_message("Leaderboard cleared"))
        .await;

    success_response(serde_json::json!({
        "message": "Leaderboard cleared successfully",
    }))
}
