use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::security::SecurityContext;

/// Extractor for the context the security gate resolved for this request.
///
/// The gate inserts it into `request.extensions()` before the request reaches any
/// handler. A missing context means the route is not behind the gate, which is a
/// wiring bug, so the rejection is a 500 rather than a 401.
#[derive(Debug, Clone)]
pub struct SecurityCtx(pub SecurityContext);

impl<S> FromRequestParts<S> for SecurityCtx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .cloned()
            .map(SecurityCtx)
            .ok_or_else(|| {
                tracing::error!("security context missing; route is not behind the gate");
                AppError::Internal
            })
    }
}
