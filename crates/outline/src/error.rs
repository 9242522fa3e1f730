use thiserror::Error;

/// Result type for outline operations
pub type Result<T> = std::result::Result<T, OutlineError>;

/// Errors raised while reading or patching outline documents
#[derive(Error, Debug)]
pub enum OutlineError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A patch targeted a line that does not start a heading
    #[error("No heading starts at line {0}")]
    HeadingNotFound(usize),

    /// Property keys must be non-empty and contain no whitespace or colons
    #[error("Invalid property key: {0:?}")]
    InvalidKey(String),
}
