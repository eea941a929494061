//! Remembers where the caller was heading so the login flow can send them back.
//!
//! The memo travels to the client as a `forwardPage` cookie; nothing is stored
//! server side. It is skipped for the exact login path and for the auth path
//! and everything below it (`/auth`, `/auth/login`, ...), not only for an exact
//! match on the auth path.

use axum::http::{HeaderMap, HeaderValue, header::SET_COOKIE};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use super::{FilterContext, RequestFilter, RequestView};

pub const FORWARD_MEMO_NAME: &str = "forwardPage";

// Cookie values may not carry separators or whitespace; `%` keeps it reversible.
const COOKIE_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b',')
    .add(b';')
    .add(b'\\')
    .add(b'%');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardMemo {
    path: String,
}

impl ForwardMemo {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn cookie(&self) -> String {
        format!(
            "{FORWARD_MEMO_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
            utf8_percent_encode(&self.path, COOKIE_VALUE)
        )
    }

    /// Best effort: a value that cannot form a header is dropped.
    pub fn attach(&self, headers: &mut HeaderMap) {
        match HeaderValue::from_str(&self.cookie()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(err) => tracing::debug!(error = %err, "forward memo not attached"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathMemoFilter {
    login_path: String,
    auth_path: String,
}

impl PathMemoFilter {
    pub fn new(login_path: impl Into<String>, auth_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            auth_path: auth_path.into(),
        }
    }

    fn is_login_or_auth(&self, path: &str) -> bool {
        if path == self.login_path {
            return true;
        }
        let auth = self.auth_path.trim_end_matches('/');
        path == auth
            || path
                .strip_prefix(auth)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl RequestFilter for PathMemoFilter {
    fn name(&self) -> &'static str {
        "path-memo"
    }

    fn process(&self, request: &RequestView<'_>, ctx: &mut FilterContext) {
        if !self.is_login_or_auth(request.path) {
            ctx.forward_memo = Some(ForwardMemo::new(request.path));
        }
    }
}
