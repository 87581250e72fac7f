/// Live updates route - long-lived text event-stream connections
///
/// Each connection gets a bounded event queue registered with the broadcast
/// hub under its client id. The response body is the stream of SSE-encoded
/// frames; when the client goes away the queue closes and the hub prunes
/// the subscriber on its next write.
use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::Response,
    routing::get,
    Router,
};
use futures::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    config,
    events::Event,
    logger::{self, LogTag},
    webserver::state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    /// Client-supplied subscriber id (uuid generated when absent)
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Create events routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/events", get(subscribe))
}

/// GET /api/events
async fn subscribe(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Response {
    let client_id = params
        .client_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let (top_count, buffer) = config::with_config(|cfg| {
        (cfg.leaderboard.top_count, cfg.leaderboard.subscriber_buffer)
    });

    let (tx, mut rx) = mpsc::channel::<Event>(buffer);
    state.hub.attach(client_id.clone(), tx).await;

    logger::info(
        LogTag::Webserver,
        &format!("subscriber {} connected", client_id),
    );

    // Fresh leaderboard for the new subscriber (broadcast, as every
    // subscriber tolerates snapshots at any time)
    match state.store.top_k(top_count).await {
        Ok(entries) => {
            state.hub.publish(Event::leaderboard_update(&entries)).await;
        }
        Err(e) => {
            logger::warning(
                LogTag::Webserver,
                &format!("failed to send initial leaderboard: {}", e),
            );
        }
    }

    let stream = futures::stream::poll_fn(move |cx| rx.poll_recv(cx))
        .map(|event| Ok::<String, Infallible>(event.encode()));

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}
