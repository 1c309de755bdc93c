//! Test execution engine
//!
//! Adapts test bodies into settleable thunks and schedules them either one
//! at a time or concurrently.

mod adapter;
mod capture;
mod parallel;
mod runner;

pub use adapter::{wrap, Done, IntoOutcome, TestBody, Thunk};
pub use runner::Runner;
