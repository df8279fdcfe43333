use thiserror::Error;

/// Failures surfaced by the API gateway. Server-provided messages (the
/// backend's `{ "message": ... }` payload) are carried through so screens
/// can show them; everything else falls back to a generic string.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", .message.as_deref().unwrap_or("unauthorized"))]
    Unauthorized { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("not found"))]
    NotFound { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("request failed"))]
    Status { status: u16, message: Option<String> },

    #[error("request could not be completed")]
    Transport(#[from] reqwest::Error),

    #[error("response body was not valid JSON")]
    Decode(#[source] serde_json::Error),

    #[error("invalid upload part: {0}")]
    InvalidUpload(String),
}

impl ApiError {
    /// The backend's own message, when the error response carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::NotFound { message }
            | ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message suitable for a transient notification: the server's own
    /// wording when available, a generic fallback otherwise.
    pub fn user_message(&self) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| "Action failed".to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}
