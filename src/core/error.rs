//! Defines the custom error type for the `core` module.

use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Only contract violations and setup failures are represented here. Unreadable
/// directories and files are recovered inside the walk and never surface as
/// errors, and cancellation is a normal terminal state.
#[derive(Debug, Error)]
pub enum SearchError {
    /// `start` was called while the worker is still walking.
    #[error("A search is already in progress")]
    AlreadyInProgress,

    /// `start` was called on a worker that already completed or was cancelled.
    /// Workers are single-use; a new search needs a new worker.
    #[error("This search worker has already finished and cannot be restarted")]
    WorkerFinished,

    /// The content needle could not be compiled into a matcher.
    #[error("Invalid content search text: {0}")]
    InvalidNeedle(#[from] regex::Error),

    /// The operating system refused to spawn the background thread.
    #[error("Failed to spawn search thread: {0}")]
    Spawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
