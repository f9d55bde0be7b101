use quill_widgets::LookupError;

/// Errors from the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {path} failed")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl From<ApiError> for LookupError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, .. } => LookupError::Status(status),
            ApiError::Decode { reason, .. } => LookupError::Decode(reason),
            ApiError::Request { source, .. } => LookupError::Transport(source.to_string()),
            other => LookupError::Transport(other.to_string()),
        }
    }
}
