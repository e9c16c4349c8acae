use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[axum::debug_handler]
pub async fn health_check() -> Response {
    Json(json!({
        "status": "ok",
        "service": "assessment-backend",
        "timestamp": chrono::Utc::now(),
    }))
    .into_response()
}
