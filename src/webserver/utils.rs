/// Shared response helpers for the API routes
///
/// Every endpoint answers with the same JSON envelope:
/// `{"success": true, "data": ...}` or
/// `{"success": false, "error": "...", "details": "..."}`.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// 200 response with a success envelope
pub fn success_response<T: Serialize>(data: T) -> Response {
    Json(serde_json::json!({
        "success": true,
        "data": data,
    }))
    .into_response()
}

/// Error response with the failure envelope
pub fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let mut body = serde_json::json!({
        "success": false,
        "error": error,
    });
    if let Some(details) = details {
        body["details"] = serde_json::Value::String(details);
    }

    (status, Json(body)).into_response()
}
