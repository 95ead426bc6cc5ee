use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Internal retry signal: the request's credentials were rotated by a
    /// successful refresh and the caller must redo the request. Consumed by
    /// `with_auth_retry`; never surfaced to the user.
    #[error("credentials rotated, request must be retried")]
    RetryRequired,

    /// Refresh token missing or rejected; the session has been torn down
    /// and a login redirect scheduled.
    #[error("session expired: {0}")]
    SessionExpired(String),

    /// Non-401 HTTP failure. `message` is the server-supplied message when
    /// the body carried one, otherwise a generic status line.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed payload where JSON was expected. Distinct from
    /// `RetryRequired` so parse failures can never be read as the retry
    /// signal.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Status-coded error with the generic "HTTP status N" message.
    pub fn http_status(status: u16) -> Self {
        ApiError::Http {
            status,
            message: format!("HTTP status {}", status),
        }
    }

    /// True for errors that leave the session intact and should simply be
    /// shown to the user.
    pub fn is_request_level(&self) -> bool {
        matches!(
            self,
            ApiError::Http { .. } | ApiError::Network(_) | ApiError::InvalidResponse(_)
        )
    }
}
