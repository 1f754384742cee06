use std::sync::Arc;

/// Header carrying the token on every mutating request
pub const CSRF_HEADER: &str = "Csrf-Token";

/// Process-wide CSRF token, resolved once at startup and handed to every
/// mutating call explicitly.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(Arc<str>);

impl CsrfToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CsrfToken(<redacted>)")
    }
}
