//! # Notebook Errors
//!
//! Error handling for the study notebook engine.
//!
//! - Uses `thiserror` for structured error definitions
//! - Named fields on every variant that carries context

use thiserror::Error;

/// Failures of the generation service.
///
/// The queue engine treats every variant the same way: the task is abandoned
/// and the message is reported. The variants exist for logging and for the
/// HTTP client's own tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Generation API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("No response from generation service")]
    EmptyResponse,

    #[error("Invalid generation response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Generation service not configured: {reason}")]
    NotConfigured { reason: String },
}

impl GenerationError {
    pub fn request_failed(reason: impl Into<String>) -> Self {
        Self::RequestFailed {
            reason: reason.into(),
        }
    }

    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }
}

/// Content store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Subject not found: {id}")]
    SubjectNotFound { id: String },

    #[error("Chapter not found: {id}")]
    ChapterNotFound { id: String },

    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    #[error("Note already exists: {id}")]
    DuplicateNote { id: String },

    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    #[error("Invalid notebook bundle: {reason}")]
    InvalidBundle { reason: String },
}

/// Task queue errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Rejected before entering the queue.
    #[error("Missing prerequisite: {reason}")]
    MissingPrerequisite { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl QueueError {
    pub fn missing_prerequisite(reason: impl Into<String>) -> Self {
        Self::MissingPrerequisite {
            reason: reason.into(),
        }
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type QueueResult<T> = Result<T, QueueError>;
