//! Filter chain + authorization policy as one pure per-request evaluation.
//!
//! The HTTP middleware turns a `GateOutcome` into a response; everything here is
//! transport-free so it can be driven directly in tests.

use crate::security::context::SecurityContext;
use crate::security::filters::{FilterChain, ForwardMemo, RequestView};
use crate::security::policy::{AuthorizationPolicy, Decision};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub decision: Decision,
    pub context: SecurityContext,
    pub forward_memo: Option<ForwardMemo>,
}

#[derive(Debug, Clone)]
pub struct SecurityGate {
    chain: FilterChain,
    policy: AuthorizationPolicy,
}

impl SecurityGate {
    pub fn new(chain: FilterChain, policy: AuthorizationPolicy) -> Self {
        Self { chain, policy }
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    pub fn policy(&self) -> &AuthorizationPolicy {
        &self.policy
    }

    pub fn evaluate(&self, request: &RequestView<'_>) -> GateOutcome {
        let filtered = self.chain.run(request);
        let context = filtered.security.into_context();
        let decision = self.policy.decide(request.path, &context);

        GateOutcome {
            decision,
            context,
            forward_memo: filtered.forward_memo,
        }
    }
}
