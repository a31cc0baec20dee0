use thiserror::Error;

/// Errors that can occur when using the notification client.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// The server-push channel could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server-push channel failed after it was opened
    #[error("Stream error: {0}")]
    Stream(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from a REST endpoint
    #[error("Request to {path} failed with status {status}")]
    Status { path: String, status: u16 },

    /// URL parsing error (malformed endpoint URL)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Application server key was not valid URL-safe base64
    #[error("Key decode error: {0}")]
    KeyDecode(#[from] base64::DecodeError),

    /// Push registration step failed
    #[error("Push subscription error: {0}")]
    Push(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for `Result<T, NotificationError>`.
pub type Result<T> = std::result::Result<T, NotificationError>;
