use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}
