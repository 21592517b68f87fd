//! Error types for session log operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when reading session logs.
///
/// Most of the pipeline degrades to "no result" instead of failing; these
/// are reserved for callers that must report why a single file was unusable.
#[derive(Debug, Error)]
pub enum TrawlError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file does not exist
    #[error("Session file not found: {}", .0.display())]
    SessionNotFound(PathBuf),

    /// The session file holds no decodable records
    #[error("Session file has no readable records: {}", .0.display())]
    EmptySession(PathBuf),
}

/// Result type for session log operations.
pub type TrawlResult<T> = Result<T, TrawlError>;
