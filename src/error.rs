//! Error types for the Bergen V3 client

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by a [`Transport`](crate::transport::Transport).
///
/// Kept cloneable so a single failed creation can be handed to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The transport could not be constructed or has no endpoint
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    /// Connection-level failure (DNS, TLS, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status without a SOAP fault body
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The service answered with a SOAP fault
    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    /// The response could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// The payload cannot be rendered as a request; nothing was sent
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Failures while populating the session cache.
///
/// Both variants are sticky: once a session records one, every later
/// acquisition on that session observes the same value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The transport handle could not be created
    #[error("Transport unavailable: {0}")]
    TransportUnavailable(String),

    /// The authentication call errored or returned no token
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
}

/// Client error types
#[derive(Debug, Error)]
pub enum Error {
    /// The transport handle or token could not be obtained
    #[error("Session unavailable: {0}")]
    SessionUnavailable(#[from] SessionError),

    /// A remote operation returned an error
    #[error("Remote operation {operation} failed: {source}")]
    RemoteOperationFailed {
        operation: String,
        #[source]
        source: TransportError,
    },

    /// No catalog entry with this name
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Call parameters are not a JSON object
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Name of the remote operation that failed, if this is a per-call failure.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Error::RemoteOperationFailed { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Whether the failure came from the session cache rather than a single call.
    pub fn is_session_failure(&self) -> bool {
        matches!(self, Error::SessionUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidParams(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}
