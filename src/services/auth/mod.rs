pub mod access_jwt;
pub mod factory;

pub use access_jwt::{AccessTokenVerifier, TokenClaims, TokenError};
pub use factory::build_security_gate;
