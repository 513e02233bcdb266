//! Signed-in user, read from `session.ron` each time a session starts.

use std::fs;
use std::io;
use std::path::PathBuf;

use jobscout_engine::{Credentials, IdentityError, SessionIdentity};
use jobscout_logging::scout_debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredSession {
    pub auth_token: Option<String>,
    pub user: Option<StoredUser>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredUser {
    pub public_id: Option<String>,
    pub uid: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
}

impl StoredSession {
    /// `public_id` wins over `uid`; token and role must both be present.
    pub fn credentials(&self) -> Result<Credentials, IdentityError> {
        let token = non_blank(self.auth_token.as_deref()).ok_or(IdentityError::MissingToken)?;
        let user = self.user.as_ref().ok_or(IdentityError::MissingRole)?;
        non_blank(user.role.as_deref()).ok_or(IdentityError::MissingRole)?;
        let session_id = non_blank(user.public_id.as_deref())
            .or_else(|| non_blank(user.uid.as_deref()))
            .ok_or(IdentityError::MissingUserId)?;
        Ok(Credentials {
            session_id: session_id.to_string(),
            bearer_token: token.to_string(),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Re-reads the credentials file on every resolve so a fresh sign-in is
/// picked up without restarting.
#[derive(Debug, Clone)]
pub struct FileIdentity {
    path: PathBuf,
}

impl FileIdentity {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<StoredSession, IdentityError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(IdentityError::MissingToken);
            }
            Err(err) => {
                return Err(IdentityError::Unavailable(format!(
                    "{}: {}",
                    self.path.display(),
                    err
                )));
            }
        };
        ron::from_str(&content).map_err(|err| {
            IdentityError::Unavailable(format!("{}: {}", self.path.display(), err))
        })
    }
}

impl SessionIdentity for FileIdentity {
    fn resolve(&self) -> Result<Credentials, IdentityError> {
        let credentials = self.load()?.credentials()?;
        scout_debug!(
            "Resolved credentials for user {} from {:?}",
            credentials.session_id,
            self.path
        );
        Ok(credentials)
    }
}
