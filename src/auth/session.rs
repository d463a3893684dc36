use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::models::{Credentials, LoginResponse};
use crate::repository::AuthRepository;

/// File the session is persisted to inside the data directory.
pub const SESSION_FILE: &str = "session.json";

/// Author name used when a session carries no display name.
const ANONYMOUS: &str = "Usuario";

/// Authenticated identity plus bearer token. All fields absent when logged out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<i64>,
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
}

impl Session {
    pub fn from_login(response: LoginResponse) -> Self {
        Self {
            token: Some(response.token),
            user_id: Some(response.user_id),
            display_name: Some(response.username),
            role_id: response.role_id,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user_id.is_some()
    }

    /// User id of a logged-in session, or `Unauthenticated` for guards to redirect on.
    pub fn require_user_id(&self) -> ClientResult<i64> {
        match (&self.token, self.user_id) {
            (Some(_), Some(id)) => Ok(id),
            _ => Err(ClientError::Unauthenticated),
        }
    }

    pub fn author_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(ANONYMOUS)
    }
}

/// Holds the current session and mirrors it to disk when backed by a file.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    current: Session,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`, restoring a previously saved session if any.
    pub fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
        let path = path.into();
        let current = if path.exists() {
            let json = fs::read_to_string(&path)?;
            match serde_json::from_str(&json) {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    Session::default()
                }
            }
        } else {
            Session::default()
        };

        Ok(Self {
            path: Some(path),
            current,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn current(&self) -> Session {
        self.current.clone()
    }

    fn replace(&mut self, session: Session) -> ClientResult<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_string_pretty(&session)?)?;
        }
        self.current = session;
        Ok(())
    }

    /// Authenticate and store the resulting session.
    ///
    /// Any failure, wrong password or unreachable server alike, is reported as
    /// `InvalidCredentials` and leaves the prior session untouched.
    pub async fn login(
        &mut self,
        auth: &dyn AuthRepository,
        credentials: &Credentials,
    ) -> ClientResult<Session> {
        let response = match auth.login(credentials).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Login failed for {}: {}", credentials.username, e);
                return Err(ClientError::InvalidCredentials);
            }
        };

        let session = Session::from_login(response);
        self.replace(session.clone())?;
        tracing::info!(
            "Logged in as {} (user {:?})",
            session.author_name(),
            session.user_id
        );
        Ok(session)
    }

    /// Forget the session. Requests already sent keep the token they carried.
    pub fn logout(&mut self) -> ClientResult<()> {
        self.current = Session::default();
        if let Some(path) = &self.path {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        tracing::info!("Logged out");
        Ok(())
    }
}
