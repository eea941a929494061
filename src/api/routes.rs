/*
 * Responsibility
 * - Local routes of the gateway (/health, login view)
 * - Everything else falls through to the upstream stand-in
 * - The security gate is layered on top in app.rs, so it sees every request
 */
use axum::{Router, routing::get};

use crate::api::handlers::{health::health, login::login, upstream::forward};
use crate::state::AppState;

pub fn routes(login_path: &str) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(login_path, get(login))
        .fallback(forward)
}
