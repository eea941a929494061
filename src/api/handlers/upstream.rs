/*
 * Responsibility
 * - Fallback for every permitted request with no local route
 * - Stands in for the reverse proxy: answers with the identity descriptor the
 *   proxy would forward (principal + authorities, or anonymous)
 */
use axum::{Json, http::Uri, response::IntoResponse};
use serde_json::json;

use crate::api::extractors::SecurityCtx;

pub async fn forward(uri: Uri, SecurityCtx(ctx): SecurityCtx) -> impl IntoResponse {
    tracing::debug!(path = uri.path(), principal = ctx.identity(), "forwarding to upstream");
    Json(json!({
        "path": uri.path(),
        "identity": ctx,
    }))
}
