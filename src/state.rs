/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - gate: filter chain + authorization policy, built once at start-up
 *   - entry point: how anonymous callers are sent to log in
 * - Cloned per request, so everything inside is Arc/Copy
 */
use std::sync::Arc;

use crate::config::EntryPoint;
use crate::security::SecurityGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub gate: Arc<SecurityGate>,
    pub entry_point: EntryPoint,
    pub login_path: Arc<str>,
}

impl AppState {
    pub fn new(gate: Arc<SecurityGate>, entry_point: EntryPoint, login_path: &str) -> Self {
        Self {
            gate,
            entry_point,
            login_path: Arc::from(login_path),
        }
    }
}
