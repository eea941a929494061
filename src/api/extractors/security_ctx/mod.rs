/*!
 * Security context extractor
 *
 * Responsibility:
 * - Hand the gate's `SecurityContext` to downstream handlers
 * - axum-specific code stays in core; the type itself lives in `security::context`
 *
 * Public API:
 * - SecurityCtx
 */

mod core;

pub use self::core::SecurityCtx;
