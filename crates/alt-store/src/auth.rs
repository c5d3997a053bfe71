//! Authorization collaborator consulted before any store access

use std::collections::HashSet;

/// What the caller presented with the request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Request token
    pub nonce: Option<String>,
}

impl Credentials {
    /// Credentials carrying a token
    #[must_use]
    pub fn with_nonce(nonce: impl Into<String>) -> Self {
        Self {
            nonce: Some(nonce.into()),
        }
    }

    /// Credentials carrying nothing
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Why a caller was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No token presented
    #[error("Permission denied")]
    MissingToken,

    /// Token presented but not recognised
    #[error("Invalid security token")]
    InvalidToken,
}

/// Decides whether a caller may use the alt text operations
pub trait Authorizer: Send + Sync + std::fmt::Debug {
    /// Check `credentials` for `action`
    ///
    /// # Errors
    /// - `AuthError` when the caller is refused
    fn authorize(&self, credentials: &Credentials, action: &str) -> Result<(), AuthError>;
}

/// Accepts every caller
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize(&self, _credentials: &Credentials, _action: &str) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Accepts callers presenting one of a fixed set of tokens
#[derive(Debug, Clone, Default)]
pub struct NonceAuthorizer {
    nonces: HashSet<String>,
    allow_anonymous: bool,
}

impl NonceAuthorizer {
    /// Create authorizer accepting `nonces`
    #[must_use]
    pub fn new<I, S>(nonces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nonces: nonces.into_iter().map(Into::into).collect(),
            allow_anonymous: false,
        }
    }

    /// With anonymous access for callers that present no token
    #[must_use]
    pub fn with_allow_anonymous(mut self, allow: bool) -> Self {
        self.allow_anonymous = allow;
        self
    }
}

impl Authorizer for NonceAuthorizer {
    fn authorize(&self, credentials: &Credentials, action: &str) -> Result<(), AuthError> {
        match credentials.nonce.as_deref().filter(|n| !n.is_empty()) {
            None if self.allow_anonymous => Ok(()),
            None => {
                tracing::warn!(action, "request without token refused");
                Err(AuthError::MissingToken)
            }
            Some(nonce) if self.nonces.contains(nonce) => Ok(()),
            Some(_) => {
                tracing::warn!(action, "request with unknown token refused");
                Err(AuthError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all() {
        assert!(AllowAll.authorize(&Credentials::anonymous(), "x").is_ok());
    }

    #[test]
    fn nonce_checks() {
        let auth = NonceAuthorizer::new(["abc123"]);
        assert!(auth.authorize(&Credentials::with_nonce("abc123"), "x").is_ok());
        assert_eq!(
            auth.authorize(&Credentials::with_nonce("nope"), "x"),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            auth.authorize(&Credentials::anonymous(), "x"),
            Err(AuthError::MissingToken)
        );
        assert_eq!(
            auth.authorize(&Credentials::with_nonce(""), "x"),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn anonymous_opt_in() {
        let auth = NonceAuthorizer::new(Vec::<String>::new()).with_allow_anonymous(true);
        assert!(auth.authorize(&Credentials::anonymous(), "x").is_ok());
        assert!(auth.authorize(&Credentials::with_nonce("bad"), "x").is_err());
    }
}
