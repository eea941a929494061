//! Route-based authorization: first matching rule decides.
//!
//! Rule order is public patterns (as configured), then role-restricted patterns
//! (as configured), then the default rule.

use std::fmt;

use crate::security::context::SecurityContext;
use crate::security::pattern::PathPattern;

/// What a matched rule asks of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    Role(String),
    Authenticated,
}

/// Outcome of evaluating a request against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Permit,
    RequireAuthentication,
    Deny { required_role: String },
}

/// Catch-all behaviour for paths no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultAccess {
    #[default]
    Authenticated,
    PermitAll,
}

/// One configured route rule; `role: None` marks a public path.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: PathPattern,
    role: Option<String>,
}

impl Rule {
    pub fn public(pattern: PathPattern) -> Self {
        Self {
            pattern,
            role: None,
        }
    }

    pub fn role(pattern: PathPattern, role: impl Into<String>) -> Self {
        Self {
            pattern,
            role: Some(role.into()),
        }
    }

    fn requirement(&self) -> Requirement {
        match &self.role {
            Some(role) => Requirement::Role(role.clone()),
            None => Requirement::PermitAll,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.role {
            Some(role) => write!(f, "{} -> hasRole({role})", self.pattern),
            None => write!(f, "{} -> permitAll", self.pattern),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    rules: Vec<Rule>,
    default_access: DefaultAccess,
    role_prefix: String,
}

impl AuthorizationPolicy {
    pub fn new(
        public: Vec<PathPattern>,
        role_restricted: Vec<(PathPattern, String)>,
        default_access: DefaultAccess,
    ) -> Self {
        let rules = public
            .into_iter()
            .map(Rule::public)
            .chain(
                role_restricted
                    .into_iter()
                    .map(|(pattern, role)| Rule::role(pattern, role)),
            )
            .collect();

        Self {
            rules,
            default_access,
            role_prefix: String::new(),
        }
    }

    /// Authority looked up for `hasRole(role)` becomes `prefix + role`.
    #[must_use]
    pub fn with_role_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.role_prefix = prefix.into();
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First-match lookup of the requirement guarding `path`.
    pub fn resolve(&self, path: &str) -> Requirement {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(Rule::requirement)
            .unwrap_or(match self.default_access {
                DefaultAccess::Authenticated => Requirement::Authenticated,
                DefaultAccess::PermitAll => Requirement::PermitAll,
            })
    }

    pub fn decide(&self, path: &str, ctx: &SecurityContext) -> Decision {
        match self.resolve(path) {
            Requirement::PermitAll => Decision::Permit,
            _ if !ctx.is_authenticated() => Decision::RequireAuthentication,
            Requirement::Authenticated => Decision::Permit,
            Requirement::Role(role) => {
                if ctx.has_authority(&format!("{}{role}", self.role_prefix)) {
                    Decision::Permit
                } else {
                    Decision::Deny {
                        required_role: role,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::context::Authority;

    fn p(s: &str) -> PathPattern {
        PathPattern::new(s).unwrap()
    }

    fn gateway_policy() -> AuthorizationPolicy {
        AuthorizationPolicy::new(
            vec![p("/auth/**"), p("/login")],
            vec![(p("/securedPage/**"), "ADMIN".to_string())],
            DefaultAccess::Authenticated,
        )
    }

    fn user(authorities: &[&str]) -> SecurityContext {
        SecurityContext::Authenticated {
            identity: "someone".into(),
            authorities: authorities.iter().map(|a| Authority::new(*a)).collect(),
        }
    }

    #[test]
    fn public_paths_permit_everyone() {
        let policy = gateway_policy();
        assert_eq!(policy.decide("/auth/login", &SecurityContext::Anonymous), Decision::Permit);
        assert_eq!(policy.decide("/login", &SecurityContext::Anonymous), Decision::Permit);
        assert_eq!(policy.decide("/login", &user(&["USER"])), Decision::Permit);
    }

    #[test]
    fn restricted_path_requires_role() {
        let policy = gateway_policy();
        assert_eq!(policy.decide("/securedPage/x", &user(&["ADMIN"])), Decision::Permit);
        assert_eq!(
            policy.decide("/securedPage/x", &user(&["USER"])),
            Decision::Deny {
                required_role: "ADMIN".into()
            }
        );
        assert_eq!(
            policy.decide("/securedPage/x", &SecurityContext::Anonymous),
            Decision::RequireAuthentication
        );
    }

    #[test]
    fn default_rule_requires_authentication() {
        let policy = gateway_policy();
        assert_eq!(
            policy.decide("/orders/1", &SecurityContext::Anonymous),
            Decision::RequireAuthentication
        );
        assert_eq!(policy.decide("/orders/1", &user(&[])), Decision::Permit);
    }

    #[test]
    fn permit_all_default_opens_unmatched_paths() {
        let policy = AuthorizationPolicy::new(
            vec![p("/auth/**")],
            vec![(p("/securedPage/**"), "ADMIN".into())],
            DefaultAccess::PermitAll,
        );
        assert_eq!(policy.decide("/orders/1", &SecurityContext::Anonymous), Decision::Permit);
        assert_eq!(
            policy.decide("/securedPage/x", &SecurityContext::Anonymous),
            Decision::RequireAuthentication
        );
    }

    #[test]
    fn public_rule_wins_over_overlapping_role_rule() {
        let policy = AuthorizationPolicy::new(
            vec![p("/securedPage/public/**")],
            vec![(p("/securedPage/**"), "ADMIN".into())],
            DefaultAccess::Authenticated,
        );
        assert_eq!(
            policy.decide("/securedPage/public/about", &SecurityContext::Anonymous),
            Decision::Permit
        );
        assert_eq!(
            policy.resolve("/securedPage/other"),
            Requirement::Role("ADMIN".into())
        );
    }

    #[test]
    fn role_rules_keep_configured_order() {
        let policy = AuthorizationPolicy::new(
            vec![],
            vec![
                (p("/ops/reports/**"), "AUDITOR".into()),
                (p("/ops/**"), "OPS".into()),
            ],
            DefaultAccess::Authenticated,
        );
        assert_eq!(policy.resolve("/ops/reports/q1"), Requirement::Role("AUDITOR".into()));
        assert_eq!(policy.resolve("/ops/restart"), Requirement::Role("OPS".into()));
        assert_eq!(
            policy.rules().iter().map(ToString::to_string).collect::<Vec<_>>(),
            ["/ops/reports/** -> hasRole(AUDITOR)", "/ops/** -> hasRole(OPS)"]
        );
        assert_eq!(gateway_policy().rules()[0].to_string(), "/auth/** -> permitAll");
    }

    #[test]
    fn role_prefix_is_applied() {
        let policy = gateway_policy().with_role_prefix("ROLE_");
        assert_eq!(policy.decide("/securedPage/x", &user(&["ROLE_ADMIN"])), Decision::Permit);
        assert!(matches!(
            policy.decide("/securedPage/x", &user(&["ADMIN"])),
            Decision::Deny { .. }
        ));
    }
}
