//! Error handling for GCodeTrace
//!
//! Provides the error types shared across the workspace:
//! - G-Code diagnostics (recorded per line, never raised while interpreting)
//! - Job errors (worker and transport faults)
//!
//! All error types use `thiserror` for ergonomic error handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// G-Code diagnostic type
///
/// Describes why a line landed in the invalid-lines list. Interpretation
/// continues past every one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GcodeError {
    /// A word letter outside the accepted alphabet, or a letter with no numeric argument
    #[error("Invalid tokens at line {line_number}")]
    InvalidTokens {
        /// 1-based line number in the source file.
        line_number: u32,
    },

    /// The `*nn` checksum did not match the XOR of the preceding characters
    #[error("Checksum mismatch at line {line_number}: expected {expected}, computed {computed}")]
    ChecksumMismatch {
        /// 1-based line number in the source file.
        line_number: u32,
        /// Checksum carried by the line.
        expected: u32,
        /// Checksum computed over the line.
        computed: u32,
    },
}

impl GcodeError {
    /// Line the diagnostic refers to
    pub fn line_number(&self) -> u32 {
        match self {
            Self::InvalidTokens { line_number } | Self::ChecksumMismatch { line_number, .. } => {
                *line_number
            }
        }
    }
}

/// Job error type
///
/// Represents faults at the worker boundary. Malformed input is never one of these.
#[derive(Error, Debug, Clone)]
pub enum JobError {
    /// The receiving side hung up before the job finished
    #[error("Job {job_id}: message channel closed")]
    ChannelClosed {
        /// Identifier of the job whose output was dropped.
        job_id: u64,
    },

    /// The worker task terminated abnormally
    #[error("Job {job_id}: worker failed: {reason}")]
    WorkerFailed {
        /// Identifier of the failed job.
        job_id: u64,
        /// Description of the failure.
        reason: String,
    },
}

/// Main error type for GCodeTrace
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code diagnostic promoted to an error by a caller
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Worker error
    #[error(transparent)]
    Job(#[from] JobError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a G-Code diagnostic
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if this is a worker error
    pub fn is_job_error(&self) -> bool {
        matches!(self, Error::Job(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
