/*
 * Responsibility
 * - GET <login path>: identifies the static login view
 * - Rendering is left to the front end; the gateway only names the view
 */
use axum::{Json, response::IntoResponse};
use serde_json::json;

pub const LOGIN_VIEW: &str = "login";

pub async fn login() -> impl IntoResponse {
    Json(json!({"view": LOGIN_VIEW}))
}
