/*
 * Responsibility
 * - Request-scoped security context and its write-once holder
 * - Canonical request path the filters and rules see
 * - Filter chain (path memo + token authentication)
 * - Route-based authorization policy and the gate combining both
 */
pub mod context;
pub mod filters;
pub mod firewall;
pub mod gate;
pub mod pattern;
pub mod policy;

pub use context::{Authority, SecurityContext};
pub use gate::{GateOutcome, SecurityGate};
pub use policy::{AuthorizationPolicy, Decision, DefaultAccess};
