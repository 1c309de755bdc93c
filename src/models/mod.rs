//! Data models for the harness
//!
//! Test state, failures, and run statistics shared by every other module.

mod failure;
mod stats;
mod test;

pub use failure::{FailureKind, PanicCapture, TestFailure};
pub use stats::{RunStats, RunSummary};
pub use test::{Modifiers, Settlement, TestKind, TestReport, TestStatus};
