//! Error types for the code commentary panel

use thiserror::Error;

/// Reason a document was turned away before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// File extension is not on the allow-list
    #[error("Unsupported file type: {extension}")]
    UnsupportedType {
        /// Extension that was rejected (empty when the file has none)
        extension: String,
    },

    /// File exceeds the configured size limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    TooLarge {
        /// Reported size in bytes
        size: u64,
        /// Configured limit in bytes
        limit: u64,
    },

    /// File has no meaningful content
    #[error("File is empty")]
    Empty,
}

/// Flat classification of [`CommentaryError`]
///
/// Renderers use this to pick a message; tests use it to tell failures apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Document rejected by validation
    Validation,
    /// Missing credential or endpoint
    Configuration,
    /// Connectivity failure or stalled stream
    Transport,
    /// HTTP 401
    Auth,
    /// HTTP 429
    RateLimit,
    /// HTTP 5xx
    Server,
    /// Any other non-2xx status
    Request,
    /// Response body did not have the expected shape
    MalformedResponse,
    /// Local failure (I/O, bad options, unknown persona)
    Internal,
}

/// Main error type for the code commentary panel
#[derive(Error, Debug)]
pub enum CommentaryError {
    /// Document failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Credential or endpoint is not configured
    #[error("Configuration required: {0}")]
    Configuration(String),

    /// Network-level failure (no connectivity, DNS, reset)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Endpoint rejected the credential
    #[error("Invalid API key. Please check your API key.")]
    Auth,

    /// Endpoint is rate limiting us
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimit,

    /// Endpoint failed with a 5xx status
    #[error("API server error (status {status}). Please try again later.")]
    Server {
        /// HTTP status code
        status: u16,
    },

    /// Endpoint failed with another non-success status
    #[error("API error: {status} {reason}")]
    Request {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase, if known
        reason: String,
    },

    /// Response body could not be interpreted
    #[error("Invalid response format from API: {0}")]
    MalformedResponse(String),

    /// No bytes arrived within the idle window
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Persona id is neither built in nor registered
    #[error("Persona \"{0}\" not found")]
    PersonaNotFound(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decode error
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),
}

/// Result type alias for commentary operations
pub type Result<T> = std::result::Result<T, CommentaryError>;

impl CommentaryError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a persona not found error
    pub fn persona_not_found(id: impl Into<String>) -> Self {
        Self::PersonaNotFound(id.into())
    }

    /// Classify a non-success HTTP status
    ///
    /// 401 is an auth failure, 429 a rate limit, anything from 500 up a
    /// server failure. Everything else keeps its status for display.
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 => Self::Auth,
            429 => Self::RateLimit,
            code if code >= 500 => Self::Server { status: code },
            code => Self::Request {
                status: code,
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            },
        }
    }

    /// Flat kind of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Transport(_) | Self::Timeout(_) => ErrorKind::Transport,
            Self::Auth => ErrorKind::Auth,
            Self::RateLimit => ErrorKind::RateLimit,
            Self::Server { .. } => ErrorKind::Server,
            Self::Request { .. } => ErrorKind::Request,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::InvalidConfig(_) | Self::PersonaNotFound(_) | Self::Io(_) | Self::JsonDecode(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Text shown to the user when a generation fails
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) | Self::Timeout(_) => {
                "Network error. Please check your internet connection.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for CommentaryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::invalid_config(err.to_string());
        }
        if err.is_timeout() {
            return Self::timeout(err.to_string());
        }
        if err.is_decode() {
            return Self::malformed(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::from_status(status);
        }
        Self::transport(err.to_string())
    }
}
