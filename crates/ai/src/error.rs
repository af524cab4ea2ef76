//! Generation service error types

/// AI result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors talking to the hosted generation service
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation service rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
