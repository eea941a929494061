/*!
 * Request filter pipeline
 *
 * Responsibility:
 * - Run an ordered list of independent filters once per request
 * - Each filter sees a read-only view of the request and mutates only the
 *   request-scoped `FilterContext`; no filter can stop the chain
 *
 * Public API:
 * - RequestFilter / FilterChain
 * - RequestView / FilterContext
 * - PathMemoFilter / TokenAuthenticationFilter / ForwardMemo
 * - CarrierLocation
 */

mod carrier;
mod path_memo;
mod token_auth;

use std::sync::Arc;

use axum::http::{HeaderMap, Request};

use crate::security::context::SecurityContextSlot;

pub use carrier::CarrierLocation;
pub use path_memo::{FORWARD_MEMO_NAME, ForwardMemo, PathMemoFilter};
pub use token_auth::TokenAuthenticationFilter;

/// Borrowed view of the parts of a request the filters are allowed to read.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub headers: &'a HeaderMap,
}

impl<'a> RequestView<'a> {
    /// View over `req` with `path` already in canonical form
    /// (see `security::firewall::canonical_path`).
    pub fn new<B>(path: &'a str, req: &'a Request<B>) -> Self {
        Self {
            path,
            query: req.uri().query(),
            headers: req.headers(),
        }
    }
}

/// Per-request state threaded through the chain. Created fresh by `FilterChain::run`.
#[derive(Debug, Default)]
pub struct FilterContext {
    pub security: SecurityContextSlot,
    pub forward_memo: Option<ForwardMemo>,
}

pub trait RequestFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, request: &RequestView<'_>, ctx: &mut FilterContext);
}

#[derive(Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn RequestFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, filter: impl RequestFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn run(&self, request: &RequestView<'_>) -> FilterContext {
        let mut ctx = FilterContext::default();
        for filter in &self.filters {
            filter.process(request, &mut ctx);
        }
        ctx
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.names())
            .finish()
    }
}
