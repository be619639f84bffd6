use serde_json::Value;
use thiserror::Error;

/// Code carried by every failure that never got a response from the backend.
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
/// Code carried by a multipart upload that failed in transport.
pub const UPLOAD_ERROR: &str = "UPLOAD_ERROR";
/// Code carried by failures raised on the client side.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Client-level error type for every call that crosses the backend boundary.
///
/// `Display` renders only the human-readable message, which is what ends up in
/// request state and notifications. Callers that need the category inspect
/// [`ClientError::code`].
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Service {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Normalized error code: the HTTP status for service failures, a fixed
    /// sentinel otherwise.
    pub fn code(&self) -> String {
        match self {
            ClientError::Network(_) => NETWORK_ERROR.to_string(),
            ClientError::Service { status, .. } => status.to_string(),
            ClientError::Upload(_) => UPLOAD_ERROR.to_string(),
            ClientError::Other(_) => UNKNOWN_ERROR.to_string(),
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            ClientError::Service { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    /// 4xx responses: the request itself was rejected.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ClientError::Service { status, .. } if (400..500).contains(status))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, ClientError::Service { status, .. } if (500..600).contains(status))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Network(e.to_string())
    }
}

impl From<anyhow::Error> for ClientError {
    fn from(e: anyhow::Error) -> Self {
        let source: &(dyn std::error::Error + 'static) = &*e;
        ClientError::Other(error_message(source))
    }
}

/// Extracts the human-readable message from any failure.
///
/// This is the only rule used to turn an error into UI state: a `ClientError`
/// yields its message, anything else its `Display` output, and an empty
/// message falls back to a generic sentence.
pub fn error_message(error: &(dyn std::error::Error + 'static)) -> String {
    let message = match error.downcast_ref::<ClientError>() {
        Some(client_error) => client_error.to_string(),
        None => error.to_string(),
    };
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

/// Local persistence failures. These never reach request state or the
/// notification queue.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt stored value: {0}")]
    Corrupt(#[from] serde_json::Error),
}
