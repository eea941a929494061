/*
 * Responsibility
 * - GET /health (liveness)
 * - Public by default configuration; the gate still runs in front of it
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
