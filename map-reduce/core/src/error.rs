use crate::job_report::Phase;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a job before or at a phase boundary
#[derive(Debug, Error)]
pub enum JobError {
    #[error("map logic is not configured (register it with JobDefinition::with_mapper)")]
    MissingMapper,

    #[error("reduce logic is not configured (register it with JobDefinition::with_reducer)")]
    MissingReducer,

    #[error("chunk size must be a positive integer")]
    InvalidChunkSize,

    #[error("worker count must be a positive integer")]
    InvalidWorkerCount,

    #[error("no input paths configured")]
    NoInputPaths,

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read input {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{phase} worker pool failed: {reason}")]
    WorkerPool { phase: Phase, reason: String },

    /// A combine or finalize hook panicked; these run outside any task
    #[error("{phase} hook failed: {reason}")]
    Hook { phase: Phase, reason: String },
}

impl JobError {
    /// Whether the error was caused by the job definition or config rather than I/O
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            JobError::MissingMapper
                | JobError::MissingReducer
                | JobError::InvalidChunkSize
                | JobError::InvalidWorkerCount
                | JobError::NoInputPaths
                | JobError::ConfigRead { .. }
                | JobError::ConfigParse { .. }
        )
    }
}

/// Error raised by user map/reduce logic for a single record or key.
/// Recovered at task level: the task is marked failed and the job goes on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserLogicError {
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("{0}")]
    Failed(String),
}

impl UserLogicError {
    pub fn failed(reason: impl Into<String>) -> Self {
        UserLogicError::Failed(reason.into())
    }
}
