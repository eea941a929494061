/*
 * Responsibility
 * - Request-scoped identity: Anonymous or Authenticated { identity, authorities }
 * - Write-once slot filled by the token filter, read by the authorization policy
 * - Serializable identity descriptor handed to the downstream router
 */
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A granted role or permission, copied verbatim from verified claims.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityContext {
    Anonymous,
    Authenticated {
        identity: String,
        authorities: Vec<Authority>,
    },
}

impl SecurityContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::Authenticated { identity, .. } => Some(identity.as_str()),
            Self::Anonymous => None,
        }
    }

    pub fn authorities(&self) -> &[Authority] {
        match self {
            Self::Authenticated { authorities, .. } => authorities,
            Self::Anonymous => &[],
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities().iter().any(|a| a.as_str() == authority)
    }
}

/// Wire shape of the identity descriptor passed downstream.
#[derive(Serialize)]
#[serde(untagged)]
enum IdentityDescriptor<'a> {
    Authenticated {
        principal: &'a str,
        authorities: &'a [Authority],
    },
    Anonymous {
        anonymous: bool,
    },
}

impl Serialize for SecurityContext {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let descriptor = match self {
            Self::Authenticated {
                identity,
                authorities,
            } => IdentityDescriptor::Authenticated {
                principal: identity,
                authorities,
            },
            Self::Anonymous => IdentityDescriptor::Anonymous { anonymous: true },
        };
        descriptor.serialize(serializer)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("security context already populated for this request")]
    AlreadySet,
}

/// Holder created empty for every request.
///
/// `authenticate` succeeds at most once; `clear` always resets to anonymous so a
/// failed verification can never leave partial state behind.
#[derive(Debug, Default)]
pub struct SecurityContextSlot {
    current: Option<SecurityContext>,
}

impl SecurityContextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticate(
        &mut self,
        identity: String,
        authorities: Vec<Authority>,
    ) -> Result<(), ContextError> {
        if self.current.is_some() {
            return Err(ContextError::AlreadySet);
        }
        self.current = Some(SecurityContext::Authenticated {
            identity,
            authorities,
        });
        Ok(())
    }

    pub fn clear(&mut self) {
        self.current = Some(SecurityContext::Anonymous);
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }

    /// Final value; an untouched slot resolves to anonymous.
    pub fn into_context(self) -> SecurityContext {
        self.current.unwrap_or(SecurityContext::Anonymous)
    }
}
