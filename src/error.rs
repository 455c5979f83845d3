/// Errors surfaced by the client layer.
///
/// Variants carry rendered messages rather than source errors so that
/// call-state trackers can hold a clone of the last failure.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Catalog API key is invalid")]
    InvalidApiKey,

    #[error("Session is no longer valid")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited by the catalog API")]
    RateLimited,

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status associated with the error, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::InvalidApiKey | ApiError::Unauthorized => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::RateLimited => Some(429),
            ApiError::Server { status, .. }
            | ApiError::Client { status, .. }
            | ApiError::Unexpected { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Storage(_) | ApiError::Decode(_) => None,
        }
    }

    /// Whether the retry policy may re-attempt the failed operation.
    ///
    /// Only transient failures qualify: no response reached us, or the
    /// server failed. Every 4xx is a statement about the request itself
    /// and is never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Server { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

pub type ClientResult<T> = Result<T, ApiError>;
