//! Error types for the YouTube playlist loader

/// Result type alias for YouTube loader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a playlist
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("YouTube API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A page did not match the expected envelope
    #[error("Invalid playlist response: {0}")]
    Schema(#[source] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A required setting is absent or empty
    #[error("Missing configuration value: {0}")]
    MissingSetting(&'static str),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an API error from a status code and the raw response body
    ///
    /// Google APIs wrap failures as `{"error": {"code": 403, "message": "..."}}`;
    /// the inner message is used when present, the raw body otherwise.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                json.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());

        Self::ApiError { status, message }
    }

    /// Check whether the error was caused by a rejected credential (400/401/403)
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::ApiError { status: 400 | 401 | 403, .. })
    }
}
