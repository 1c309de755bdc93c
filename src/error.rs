//! Harness errors
//!
//! Per-test failures never show up here; they are recorded on the test's
//! report. Only registration mistakes and aborted runs reach the caller.

use thiserror::Error;

use crate::models::TestFailure;

/// Errors returned by the harness API
#[derive(Error, Debug, Clone)]
pub enum HarnessError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("run aborted at test {index} ({title}): {reason}")]
    RunAbort {
        index: usize,
        title: String,
        reason: TestFailure,
    },
}

impl HarnessError {
    /// The failure that aborted the run, if any
    pub fn reason(&self) -> Option<&TestFailure> {
        match self {
            HarnessError::RunAbort { reason, .. } => Some(reason),
            HarnessError::InvalidArgument(_) => None,
        }
    }
}

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;
