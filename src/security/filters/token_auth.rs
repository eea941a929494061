//! Bearer token → `SecurityContext`.
//!
//! Never rejects a request: an absent token leaves the slot untouched and any
//! verification failure resets it to anonymous. Authorization happens later.

use std::sync::Arc;

use super::{CarrierLocation, FilterContext, RequestFilter, RequestView};
use crate::security::context::Authority;
use crate::services::auth::{AccessTokenVerifier, TokenClaims, TokenError};

#[derive(Debug, Clone)]
pub struct TokenAuthenticationFilter {
    carrier: CarrierLocation,
    prefix: String,
    verifier: Arc<AccessTokenVerifier>,
}

impl TokenAuthenticationFilter {
    pub fn new(
        carrier: CarrierLocation,
        prefix: impl Into<String>,
        verifier: Arc<AccessTokenVerifier>,
    ) -> Self {
        Self {
            carrier,
            prefix: prefix.into(),
            verifier,
        }
    }

    /// Raw token behind the prefix, or `None` when the carrier is absent or foreign.
    fn raw_token<'v>(&self, carrier_value: &'v str) -> Option<&'v str> {
        carrier_value
            .strip_prefix(self.prefix.as_str())
            .map(str::trim_start)
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verifier.verify(token)
    }
}

impl RequestFilter for TokenAuthenticationFilter {
    fn name(&self) -> &'static str {
        "token-authentication"
    }

    fn process(&self, request: &RequestView<'_>, ctx: &mut FilterContext) {
        let Some(carrier_value) = self.carrier.extract(request) else {
            tracing::debug!(carrier = %self.carrier.describe(), "no access token presented");
            return;
        };
        let Some(token) = self.raw_token(&carrier_value) else {
            tracing::debug!(carrier = %self.carrier.describe(), "carrier value without expected prefix");
            return;
        };

        match self.verify(token) {
            Ok(claims) => {
                tracing::debug!(expires_at = %claims.expires_at(), "access token verified");
                let (subject, authorities) = claims.into_parts();
                let authorities = authorities.into_iter().map(Authority::new).collect();
                if let Err(err) = ctx.security.authenticate(subject, authorities) {
                    tracing::warn!(error = %err, "security context rejected second write");
                    ctx.security.clear();
                }
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    kind = err.category(),
                    path = request.path,
                    "access token verification failed"
                );
                ctx.security.clear();
            }
        }
    }
}
