use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrintHubError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Transform failed: {0}")]
    Transform(String),

    #[error("Unsupported format: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
