/*
 * Responsibility
 * - Load settings from the environment (+ .env)
 * - Token / access-policy settings with their defaults
 * - Validate values (invalid configuration fails start-up)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::security::DefaultAccess;
use crate::security::filters::CarrierLocation;

pub const DEFAULT_SIGNING_SECRET: &str = "JwtSecretKey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("invalid path pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// HMAC key bytes. Never printed.
#[derive(Clone)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_SIGNING_SECRET
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(**redacted**)")
    }
}

/// What an anonymous caller gets on a path that needs a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryPoint {
    #[default]
    RedirectToLogin,
    Unauthorized,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub carrier: CarrierLocation,
    pub prefix: String,
    pub signing_secret: SigningSecret,
    // Informational; expiry is enforced by the token's own `exp`.
    pub expiry_seconds: u64,
    pub leeway_seconds: u64,
    pub public_path_patterns: Vec<String>,
    pub role_restricted_paths: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct AccessConfig {
    pub login_path: String,
    pub auth_path: String,
    pub entry_point: EntryPoint,
    pub role_prefix: String,
    pub default_access: DefaultAccess,
}

#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    pub body_limit_bytes: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub http: HttpConfig,
    pub token: TokenConfig,
    pub access: AccessConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&lookup, "PORT", 8080)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));
        let cors_allowed_origins = split_list(&lookup("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let http = HttpConfig {
            body_limit_bytes: parse_or(&lookup, "HTTP_BODY_LIMIT_BYTES", 1024 * 1024)?,
            timeout_seconds: parse_or(&lookup, "HTTP_TIMEOUT_SECONDS", 30)?,
        };

        let token = token_config(&lookup)?;
        if app_env.is_production() && token.signing_secret.is_default() {
            return Err(ConfigError::Invalid("SECURITY_JWT_SECRET"));
        }

        let access = access_config(&lookup)?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            http,
            token,
            access,
        })
    }
}

fn token_config<F>(lookup: &F) -> Result<TokenConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let carrier = match lookup("SECURITY_JWT_CARRIER")
        .unwrap_or_else(|| "header".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "header" => {
            let name = lookup("SECURITY_JWT_HEADER").unwrap_or_else(|| "Authorization".to_string());
            let name = HeaderName::from_str(name.trim())
                .map_err(|_| ConfigError::Invalid("SECURITY_JWT_HEADER"))?;
            CarrierLocation::Header(name)
        }
        "query" | "param" | "query_param" => {
            let name = lookup("SECURITY_JWT_PARAM").unwrap_or_else(|| "access_token".to_string());
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("SECURITY_JWT_PARAM"));
            }
            CarrierLocation::QueryParam(name.trim().to_string())
        }
        _ => return Err(ConfigError::Invalid("SECURITY_JWT_CARRIER")),
    };

    let prefix = lookup("SECURITY_JWT_PREFIX").unwrap_or_else(|| "Bearer".to_string());
    let signing_secret = SigningSecret::new(
        lookup("SECURITY_JWT_SECRET").unwrap_or_else(|| DEFAULT_SIGNING_SECRET.to_string()),
    );
    if signing_secret.as_bytes().is_empty() {
        return Err(ConfigError::Missing("SECURITY_JWT_SECRET"));
    }

    let expiry_seconds = parse_or(lookup, "SECURITY_JWT_EXPIRATION", 24 * 60 * 60)?;
    let leeway_seconds = parse_or(lookup, "SECURITY_JWT_LEEWAY_SECONDS", 0)?;

    // The token-issuing service path is always public and always first.
    let mut public_path_patterns =
        vec![lookup("SECURITY_JWT_URI").unwrap_or_else(|| "/auth/**".to_string())];
    public_path_patterns.extend(split_list(
        &lookup("SECURITY_PUBLIC_PATHS").unwrap_or_else(|| "/login,/health".to_string()),
    ));

    let role_restricted_paths = parse_role_rules(
        &lookup("SECURITY_ROLE_RESTRICTED_PATHS")
            .unwrap_or_else(|| "/securedPage/**=ADMIN".to_string()),
    )?;

    Ok(TokenConfig {
        carrier,
        prefix,
        signing_secret,
        expiry_seconds,
        leeway_seconds,
        public_path_patterns,
        role_restricted_paths,
    })
}

fn access_config<F>(lookup: &F) -> Result<AccessConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let entry_point = match lookup("SECURITY_ENTRY_POINT")
        .unwrap_or_else(|| "redirect".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "redirect" => EntryPoint::RedirectToLogin,
        "unauthorized" | "401" => EntryPoint::Unauthorized,
        _ => return Err(ConfigError::Invalid("SECURITY_ENTRY_POINT")),
    };

    let default_access = match lookup("SECURITY_DEFAULT_ACCESS")
        .unwrap_or_else(|| "authenticated".to_string())
        .to_ascii_lowercase()
        .as_str()
    {
        "authenticated" => DefaultAccess::Authenticated,
        "permit_all" | "permitall" => DefaultAccess::PermitAll,
        _ => return Err(ConfigError::Invalid("SECURITY_DEFAULT_ACCESS")),
    };

    let login_path = lookup("SECURITY_LOGIN_PATH").unwrap_or_else(|| "/login".to_string());
    if !login_path.starts_with('/') {
        return Err(ConfigError::Invalid("SECURITY_LOGIN_PATH"));
    }
    let auth_path = lookup("SECURITY_AUTH_PATH").unwrap_or_else(|| "/auth".to_string());
    if !auth_path.starts_with('/') {
        return Err(ConfigError::Invalid("SECURITY_AUTH_PATH"));
    }

    Ok(AccessConfig {
        login_path,
        auth_path,
        entry_point,
        role_prefix: lookup("SECURITY_ROLE_PREFIX").unwrap_or_default(),
        default_access,
    })
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// "/securedPage/**=ADMIN,/ops/**=OPS"
fn parse_role_rules(raw: &str) -> Result<Vec<(String, String)>, ConfigError> {
    split_list(raw)
        .into_iter()
        .map(|entry| {
            let (pattern, role) = entry
                .split_once('=')
                .ok_or(ConfigError::Invalid("SECURITY_ROLE_RESTRICTED_PATHS"))?;
            let (pattern, role) = (pattern.trim(), role.trim());
            if pattern.is_empty() || role.is_empty() {
                return Err(ConfigError::Invalid("SECURITY_ROLE_RESTRICTED_PATHS"));
            }
            Ok((pattern.to_string(), role.to_string()))
        })
        .collect()
}
