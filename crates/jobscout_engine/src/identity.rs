use std::fmt;

/// Who the live stream belongs to, and the bearer credential forwarded to the API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub session_id: String,
    pub bearer_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("session_id", &self.session_id)
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("not signed in: no auth token found")]
    MissingToken,
    #[error("user id not found, please log in again")]
    MissingUserId,
    #[error("signed-in user has no role")]
    MissingRole,
    #[error("failed to load credentials: {0}")]
    Unavailable(String),
}

/// Resolves the signed-in user at the moment a session starts.
pub trait SessionIdentity: Send + Sync {
    fn resolve(&self) -> Result<Credentials, IdentityError>;
}

/// Fixed credentials, mostly for tests and scripted runs.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    credentials: Credentials,
}

impl StaticIdentity {
    pub fn new(session_id: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            credentials: Credentials {
                session_id: session_id.into(),
                bearer_token: bearer_token.into(),
            },
        }
    }
}

impl SessionIdentity for StaticIdentity {
    fn resolve(&self) -> Result<Credentials, IdentityError> {
        if self.credentials.bearer_token.is_empty() {
            return Err(IdentityError::MissingToken);
        }
        if self.credentials.session_id.trim().is_empty() {
            return Err(IdentityError::MissingUserId);
        }
        Ok(self.credentials.clone())
    }
}
