use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkError>;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Outline error: {0}")]
    OutlineError(#[from] backlog_outline::OutlineError),

    #[error("Task root not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
