//! tapkit - a small TAP-producing test harness
//!
//! Tests are registered on a [`Harness`] as plain closures, futures or
//! completion-handle callbacks, then run serially or concurrently. Every
//! lifecycle step is published as an [`Event`] and the default reporter turns
//! those into TAP version 13 on stdout.
//!
//! ## Features
//!
//! - Sync, async and callback-style bodies with uniform failure handling
//! - Panics, returned errors and `done.fail(..)` all reject a test the same way
//! - `skip` and `todo` modifiers
//! - Serial or bounded concurrent scheduling, results in registration order
//! - TAP, NDJSON and summary reporters, or any custom [`Listener`]
//! - Layered configuration from file, `TAPKIT_*` variables and CLI switches
//!
//! ## Usage
//!
//! ```no_run
//! use tapkit::{Harness, RunOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut harness = Harness::new();
//!     harness
//!         .add("one", |_| assert_eq!(1, 1))
//!         .add_callback("two", |_, done| done.ok())
//!         .todo("three");
//!
//!     let code = match harness.run(RunOptions::new()).await {
//!         Ok(summary) => summary.exit_code(),
//!         Err(_) => 1,
//!     };
//!     std::process::exit(code.into());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod harness;
pub mod models;
pub mod output;
pub mod utils;

pub use config::{HarnessConfig, RunOptions};
pub use error::HarnessError;
pub use events::{Event, EventBus, EventKind, Listener};
pub use executor::{Done, TestBody};
pub use harness::{Harness, TestSpec, Title};
pub use models::{
    Modifiers, RunStats, RunSummary, TestFailure, TestKind, TestReport, TestStatus,
};
pub use output::OutputFormat;
