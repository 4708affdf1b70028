use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    // Tracker responses
    #[error("Invalid Jira credentials")]
    Authentication,

    #[error("CAPTCHA challenge triggered")]
    Challenge,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    Request(String),

    #[error("Unhandled Jira response ({status}): {body}")]
    Unclassified { status: u16, body: String },

    #[error("Invalid response from Jira: {0}")]
    InvalidResponse(String),

    // Projection and lookups
    #[error("Malformed ticket: {0}")]
    MalformedEntity(String),

    #[error("Ambiguous result: {0}")]
    AmbiguousResult(String),

    #[error("'{0}' is not an attribute of GitRepo")]
    UnknownAttribute(String),

    // Mutations
    #[error("Failed to {action} ({status}): {body}")]
    MutationFailed {
        action: String,
        status: u16,
        body: String,
    },

    #[error("'{transition}' is not a valid transition for {key}")]
    TransitionNotFound { key: String, transition: String },

    // Setup and network
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Transport(String),
}

impl TrackerError {
    /// True for the "no such ticket/release" family, which callers may treat as no data.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::NotFound(_))
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TrackerError::Transport(format!("request timed out: {}", err))
        } else if err.is_connect() {
            TrackerError::Transport(format!("connection failed: {}", err))
        } else if err.is_decode() {
            TrackerError::InvalidResponse(err.to_string())
        } else {
            TrackerError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::InvalidResponse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
