//! Security gate middleware: filter chain + authorization decision → response.
//!
//! The gate sees the canonical path only; a path that is not canonical is
//! answered with 400 before any filter runs.
//!
//! - `Permit`: the resolved `SecurityContext` goes into request extensions and the
//!   request continues to the router
//! - `RequireAuthentication`: redirect to the login page (or 401, per config)
//! - `Deny`: 403
//! - A forward memo, when produced, is attached to whichever response goes out

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::config::EntryPoint;
use crate::error::AppError;
use crate::security::Decision;
use crate::security::filters::RequestView;
use crate::security::firewall::canonical_path;
use crate::state::AppState;

/// Put the security gate in front of every route of `router`.
///
/// ```ignore
/// let app = api::routes();
/// let app = middleware::auth::access::apply(app, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 `from_fn` cannot take a State extractor, so pass state via `from_fn_with_state`
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let outcome = match canonical_path(req.uri().path()) {
        Ok(path) => state.gate.evaluate(&RequestView::new(&path, &req)),
        Err(err) => {
            tracing::info!(path = req.uri().path(), error = %err, "request path refused");
            return AppError::BadRequest.into_response();
        }
    };

    let mut response = match outcome.decision {
        Decision::Permit => {
            // handed to the `SecurityCtx` extractor
            req.extensions_mut().insert(outcome.context);
            next.run(req).await
        }
        Decision::RequireAuthentication => {
            tracing::debug!(path = req.uri().path(), "authentication required");
            entry_point_response(&state)
        }
        Decision::Deny { required_role } => {
            tracing::info!(
                path = req.uri().path(),
                principal = outcome.context.identity().unwrap_or_default(),
                required_role = %required_role,
                "access denied"
            );
            AppError::Forbidden.into_response()
        }
    };

    if let Some(memo) = outcome.forward_memo {
        memo.attach(response.headers_mut());
    }
    response
}

fn entry_point_response(state: &AppState) -> Response {
    match state.entry_point {
        // 302 like a form-login entry point (axum's `Redirect::to` would be 303).
        EntryPoint::RedirectToLogin => {
            (StatusCode::FOUND, [(header::LOCATION, &*state.login_path)]).into_response()
        }
        EntryPoint::Unauthorized => AppError::Unauthorized.into_response(),
    }
}
