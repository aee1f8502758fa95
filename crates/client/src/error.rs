use innohub_notifications::StoreError;

/// Errors from the callable-function HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The function answered with a non-2xx status.
    #[error("Callable function error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the raw body.
        message: String,
    },

    /// The function rejected the caller's credentials.
    #[error("Callable function rejected the credentials: {0}")]
    Unauthenticated(String),

    /// A 2xx response without a `result` member.
    #[error("Callable response has no result")]
    MissingResult,
}

impl From<ClientError> for StoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(e) if e.is_decode() => StoreError::Malformed(e.to_string()),
            ClientError::Request(e) => StoreError::Transport(e.to_string()),
            ClientError::Api { status, message } => StoreError::Remote { status, message },
            ClientError::Unauthenticated(_) => StoreError::Unauthenticated,
            missing @ ClientError::MissingResult => StoreError::Malformed(missing.to_string()),
        }
    }
}

/// Errors loading [`ClientConfig`](crate::ClientConfig) from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}
