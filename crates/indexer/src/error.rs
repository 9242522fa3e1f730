use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Outline error: {0}")]
    OutlineError(#[from] backlog_outline::OutlineError),

    #[error("Task root not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown category prefix: {0}")]
    UnknownPrefix(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("No id left after {0}")]
    IdSpaceExhausted(String),
}
