/// Factory: build the `SecurityGate` (filters + policy) from application `Config`.
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::security::filters::{FilterChain, PathMemoFilter, TokenAuthenticationFilter};
use crate::security::pattern::PathPattern;
use crate::security::{AuthorizationPolicy, SecurityGate};
use crate::services::auth::AccessTokenVerifier;

pub fn build_security_gate(config: &Config) -> Result<Arc<SecurityGate>, ConfigError> {
    let token = &config.token;
    let access = &config.access;

    let verifier = Arc::new(AccessTokenVerifier::new(
        token.signing_secret.as_bytes(),
        token.leeway_seconds,
    ));

    let chain = FilterChain::new()
        .with(PathMemoFilter::new(&access.login_path, &access.auth_path))
        .with(TokenAuthenticationFilter::new(
            token.carrier.clone(),
            &token.prefix,
            verifier,
        ));

    let public = token
        .public_path_patterns
        .iter()
        .map(|p| compile(p))
        .collect::<Result<Vec<_>, _>>()?;
    let role_restricted = token
        .role_restricted_paths
        .iter()
        .map(|(p, role)| Ok((compile(p)?, role.clone())))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let policy = AuthorizationPolicy::new(public, role_restricted, access.default_access)
        .with_role_prefix(&access.role_prefix);

    for rule in policy.rules() {
        tracing::debug!(%rule, "authorization rule");
    }
    tracing::info!(
        filters = ?chain.names(),
        carrier = %token.carrier.describe(),
        token_expiry_seconds = token.expiry_seconds,
        rules = policy.rules().len(),
        "security gate ready"
    );

    Ok(Arc::new(SecurityGate::new(chain, policy)))
}

fn compile(pattern: &str) -> Result<PathPattern, ConfigError> {
    PathPattern::new(pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
