use axum::Router;
use std::sync::Arc;

use crate::webserver::state::AppState;

pub mod config;
pub mod events;
pub mod leaderboard;
pub mod score;
pub mod status;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(status::routes())
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(leaderboard::routes())
        .merge(score::routes())
        .merge(events::routes())
        .merge(config::routes())
}
