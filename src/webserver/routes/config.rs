/// Configuration API routes
///
/// View and mutate the runtime configuration: the limiter's window/capacity
/// and the leaderboard top count.
use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config,
    limiter::RateLimitUpdate,
    logger::{self, LogTag},
    webserver::{
        state::AppState,
        utils::{error_response, success_response},
    },
};

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitView {
    pub window_ms: u64,
    pub max_weight: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaderboardUpdate {
    pub top_count: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigUpdateRequest {
    pub rate_limit: Option<RateLimitUpdate>,
    pub leaderboard: Option<LeaderboardUpdate>,
}

// ============================================================================
// ROUTES
// ============================================================================

/// Create config routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/config", get(get_config).post(update_config))
}

/// GET /api/config
async fn get_config(State(state): State<Arc<AppState>>) -> Response {
    let rate_limit = state.limiter.get_config();
    let top_count = config::with_config(|cfg| cfg.leaderboard.top_count);

    success_response(serde_json::json!({
        "rateLimit": RateLimitView {
            window_ms: rate_limit.window_ms,
            max_weight: rate_limit.max_weight,
        },
        "leaderboard": {
            "topCount": top_count,
        },
        "sse": {
            "connectedClients": state.hub.subscriber_count().await,
        },
    }))
}

/// POST /api/config
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigUpdateRequest>,
) -> Response {
    if let Some(rate_limit) = request.rate_limit {
        match state.limiter.update_config(rate_limit) {
            Ok(applied) => {
                logger::info(
                    LogTag::Config,
                    &format!(
                        "rate limit updated: window_ms={} max_weight={}",
                        applied.window_ms, applied.max_weight
                    ),
                );
            }
            Err(e) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Failed to update configuration",
                    Some(e.to_string()),
                );
            }
        }
    }

    if let Some(leaderboard) = request.leaderboard {
        if let Some(top_count) = leaderboard.top_count {
            config::update_config(|cfg| cfg.leaderboard.top_count = top_count);
            logger::info(
                LogTag::Config,
                &format!("leaderboard top count updated: {}", top_count),
            );
        }
    }

    success_response(serde_json::json!({
        "message": "Configuration updated successfully",
    }))
}
