use crate::routes::Route;
use crate::validation::ValidationErrors;

/// Message shown for every failed login, whatever the underlying cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials or server error";

const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Not logged in")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the failing call was doing. Decides how a backend failure surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Loading data for display.
    Fetch,
    /// Submitting a form or otherwise changing backend state.
    Mutation,
}

/// Coarse classification used by screens to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Field-scoped, never reached the network.
    Validation,
    /// Missing session or rejected login.
    Authentication,
    /// A load failed: log it and show an empty or loading view.
    Fetch,
    /// A submit failed: blocking notice, form values kept.
    Mutation,
}

impl ClientError {
    pub fn kind(&self, operation: Operation) -> ErrorKind {
        match self {
            ClientError::Validation(_) | ClientError::BadRequest(_) => ErrorKind::Validation,
            ClientError::Unauthenticated | ClientError::InvalidCredentials => {
                ErrorKind::Authentication
            }
            _ => match operation {
                Operation::Fetch => ErrorKind::Fetch,
                Operation::Mutation => ErrorKind::Mutation,
            },
        }
    }

    /// Where a guarded screen should send the user, if anywhere.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            ClientError::Unauthenticated => Some(Route::Login),
            _ => None,
        }
    }

    /// Text for a blocking notification. Internal details are logged, not shown.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(errors) => errors
                .first()
                .map(|(_, message)| message.to_string())
                .unwrap_or_else(|| "Please review the form.".to_string()),
            ClientError::Unauthenticated => "You need to log in first.".to_string(),
            ClientError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            ClientError::NotFound(what) => format!("{} not found", what),
            ClientError::BadRequest(msg) => msg.clone(),
            ClientError::Status { status, body } => {
                tracing::error!("Backend returned {}: {}", status, body);
                if body.trim().is_empty() {
                    GENERIC_MESSAGE.to_string()
                } else {
                    body.clone()
                }
            }
            ClientError::Http(e) => {
                tracing::error!("HTTP error: {}", e);
                GENERIC_MESSAGE.to_string()
            }
            ClientError::Url(e) => {
                tracing::error!("URL error: {}", e);
                GENERIC_MESSAGE.to_string()
            }
            ClientError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                GENERIC_MESSAGE.to_string()
            }
            ClientError::Io(e) => {
                tracing::error!("IO error: {}", e);
                GENERIC_MESSAGE.to_string()
            }
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
