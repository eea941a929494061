//! Canonical request path for the security filters.
//!
//! Rules and memos are matched against the percent-decoded path. Any path whose
//! decoded form a downstream service could read differently is refused: encoded
//! `/`, `\` or `%`, empty segments (`//`), dot segments (`.`, `..`), `;` path
//! parameters, control characters and invalid UTF-8.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathRejection {
    #[error("path is not valid UTF-8 once decoded")]
    InvalidEncoding,
    #[error("path carries an encoded '{0}'")]
    EncodedSeparator(char),
    #[error("path contains an empty segment")]
    EmptySegment,
    #[error("path contains a dot segment")]
    DotSegment,
    #[error("path contains a forbidden character")]
    ForbiddenCharacter,
}

/// Decode `raw` and check that it is in canonical form.
///
/// Borrows `raw` when nothing was escaped.
pub fn canonical_path(raw: &str) -> Result<Cow<'_, str>, PathRejection> {
    if let Some(sep) = encoded_separator(raw) {
        return Err(PathRejection::EncodedSeparator(sep));
    }

    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| PathRejection::InvalidEncoding)?;

    if decoded
        .chars()
        .any(|c| c.is_control() || matches!(c, '\\' | ';' | '%'))
    {
        return Err(PathRejection::ForbiddenCharacter);
    }

    // A trailing slash is fine; an empty segment anywhere else is not.
    let segments: Vec<&str> = decoded.trim_start_matches('/').split('/').collect();
    if decoded.starts_with("//") {
        return Err(PathRejection::EmptySegment);
    }
    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            "." | ".." => return Err(PathRejection::DotSegment),
            "" if i + 1 < segments.len() => return Err(PathRejection::EmptySegment),
            _ => {}
        }
    }

    Ok(decoded)
}

fn encoded_separator(raw: &str) -> Option<char> {
    let bytes = raw.as_bytes();
    bytes
        .windows(3)
        .filter(|w| w[0] == b'%')
        .filter_map(|w| {
            let hex = std::str::from_utf8(&w[1..]).ok()?;
            u8::from_str_radix(hex, 16).ok()
        })
        .map(char::from)
        .find(|c| matches!(c, '/' | '\\' | '%'))
}
