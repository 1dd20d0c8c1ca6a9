//! Error types for the Where@ SDK

use thiserror::Error;

/// Errors that can occur when using the Where@ SDK
#[derive(Error, Debug)]
pub enum SdkError {
    /// Record store failure (embedded mode)
    #[error("Store error: {0}")]
    Store(#[from] whereat::StoreError),

    /// Chat dispatch failure (embedded mode)
    #[error("Chat error: {0}")]
    Chat(#[from] whereat::ChatError),

    /// Non-success response from the server (remote mode)
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
