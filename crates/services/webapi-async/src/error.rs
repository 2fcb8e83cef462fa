use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a web API call, carrying the caller's message.
///
/// `Display` shows only the message; the underlying [`ResponseError`] is the
/// error source.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct WebApiError {
    message: String,
    #[source]
    cause: ResponseError,
}

impl WebApiError {
    /// Wraps `cause`; without a caller message the cause's text is used.
    #[must_use]
    pub fn new(message: Option<&str>, cause: ResponseError) -> Self {
        let message = message.map_or_else(|| cause.to_string(), str::to_string);
        Self { message, cause }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn cause(&self) -> &ResponseError {
        &self.cause
    }

    /// HTTP status, when the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match &self.cause {
            ResponseError::Status { status, .. } => Some(*status),
            ResponseError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.cause, ResponseError::Unauthorized { .. })
    }

    /// Normalized error body, when the server answered.
    #[must_use]
    pub const fn data(&self) -> Option<&ErrorData> {
        match &self.cause {
            ResponseError::Status { data, .. } | ResponseError::Unauthorized { data } => {
                Some(data)
            }
            _ => None,
        }
    }
}

/// What went wrong with a single request
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Connection failure, timeout or body read error
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status other than 401
    #[error("request failed with status {status}")]
    Status { status: StatusCode, data: ErrorData },

    /// 401 from the web API
    #[error("request was not authorized")]
    Unauthorized { data: ErrorData },

    /// Success body did not match the expected shape
    #[error("Serialization error: {0}")]
    Decode(String),

    /// Invalid client configuration or header value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Download did not finish within its overall time limit, retries included
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl ResponseError {
    /// Gateway errors and transport-level timeouts or connect failures.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => crate::retry::is_retryable_status(status.as_u16()),
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Unauthorized { .. } | Self::Decode(_) | Self::Config(_) | Self::Timeout(_) => {
                false
            }
        }
    }
}

/// Error response body after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorData {
    Empty,
    Json(serde_json::Value),
    Text(String),
    Binary(bytes::Bytes),
}

impl ErrorData {
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Maps a serde deserialization error to a [`ResponseError`] with context
#[must_use]
pub fn map_deser(e: &serde_json::Error, body: &[u8]) -> ResponseError {
    let snippet = String::from_utf8_lossy(&body[..body.len().min(400)]).to_string();
    ResponseError::Decode(format!("{e}: {snippet}"))
}
