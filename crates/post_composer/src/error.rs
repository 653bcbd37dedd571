//! Error types for post composition.

use thiserror::Error;

/// Result type for composer operations.
pub type Result<T> = std::result::Result<T, ComposeError>;

#[derive(Debug, Error)]
pub enum ComposeError {
    /// A required setting (endpoint, model) is absent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection failure or timeout talking to the model endpoint.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response from the model endpoint.
    #[error("model endpoint returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not a chat completion.
    #[error("parse error: {0}")]
    Parse(String),

    /// The completion had no choices or only whitespace.
    #[error("model returned an empty completion")]
    EmptyCompletion,
}
