use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

// Errors returned by access-token verification + claim extraction.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token rejected: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("claims could not be decoded: {0}")]
    ClaimsMalformed(#[source] jsonwebtoken::errors::Error),
    #[error("missing or empty '{0}' claim")]
    MissingClaim(&'static str),
}

impl TokenError {
    /// Coarse category used as a structured log field.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Expired | Self::Invalid(_) => "token_invalid",
            Self::ClaimsMalformed(_) | Self::MissingClaim(_) => "claims_malformed",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => Self::ClaimsMalformed(e),
            _ => Self::Invalid(e),
        }
    }
}

/// Payload as minted by the auth service. Everything optional is checked by hand
/// so a missing list surfaces as `MissingClaim` rather than a decode error.
#[derive(Debug, Clone, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    exp: i64,
    #[serde(default)]
    authorities: Option<Vec<String>>,
}

/// Verified token payload.
///
/// Only `AccessTokenVerifier::verify` produces this type, so holding one means the
/// signature and expiry have been checked.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    subject: String,
    authorities: Vec<String>,
    expires_at: DateTime<Utc>,
}

impl TokenClaims {
    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.subject, self.authorities)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// HMAC (HS256) access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AccessTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AccessTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AccessTokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenVerifier {
    pub fn new(signing_secret: &[u8], leeway_seconds: u64) -> Self {
        let decoding_key = DecodingKey::from_secret(signing_secret);

        // `exp` stays required; audience is not part of these tokens.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        validation.validate_aud = false;

        Self {
            decoding_key,
            validation,
        }
    }

    /// Verify signature and expiry, then lift the payload into `TokenClaims`.
    ///
    /// `jsonwebtoken::Validation` checks:
    /// - signature (HS256 only)
    /// - `exp` presence and value
    ///
    /// This method additionally requires a non-empty `sub` and an `authorities` list.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<RawClaims>(token, &self.decoding_key, &self.validation)?;
        let RawClaims {
            sub,
            exp,
            authorities,
        } = data.claims;

        let subject = sub
            .filter(|s| !s.trim().is_empty())
            .ok_or(TokenError::MissingClaim("sub"))?;
        let authorities = authorities.ok_or(TokenError::MissingClaim("authorities"))?;
        let expires_at =
            DateTime::<Utc>::from_timestamp(exp, 0).ok_or(TokenError::MissingClaim("exp"))?;

        Ok(TokenClaims {
            subject,
            authorities,
            expires_at,
        })
    }
}
