//! Ant-style path globs used by the authorization rules and public-path lists.
//!
//! - `*` matches inside a single path segment
//! - `**` spans any number of segments
//! - a trailing `/**` also matches the bare prefix (`/auth/**` matches `/auth`)

use std::fmt;

use glob::{MatchOptions, Pattern, PatternError};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Clone)]
pub struct PathPattern {
    source: String,
    pattern: Pattern,
    // `/auth/**` -> Some("/auth")
    bare_prefix: Option<String>,
}

impl PathPattern {
    pub fn new(source: &str) -> Result<Self, PatternError> {
        let pattern = Pattern::new(source)?;
        let bare_prefix = source
            .strip_suffix("/**")
            .map(|p| if p.is_empty() { "/".to_string() } else { p.to_string() });

        Ok(Self {
            source: source.to_string(),
            pattern,
            bare_prefix,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.bare_prefix.as_deref() == Some(path) {
            return true;
        }
        self.pattern.matches_with(path, MATCH_OPTIONS)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.source).finish()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
