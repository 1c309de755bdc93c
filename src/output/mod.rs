//! Reporters
//!
//! Every reporter is an [`events::Listener`](crate::events::Listener). None of
//! them touch the process exit status; that is left to the caller of `run`.

mod format;
mod json;
mod summary;
mod tap;

pub use format::{diagnostic, OutputFormat, SharedBuffer, Sink};
pub use json::JsonReporter;
pub use summary::SummaryReporter;
pub use tap::TapReporter;

use std::sync::Arc;

use crate::config::HarnessConfig;
use crate::events::Listener;

/// Reporter for the configured output format
pub fn reporter_for(config: &HarnessConfig, sink: Sink) -> Arc<dyn Listener> {
    match config.format {
        OutputFormat::Tap => Arc::new(
            TapReporter::new(sink)
                .show_stack(config.show_stack)
                .hide_skip(config.hide_skip),
        ),
        OutputFormat::Json => Arc::new(JsonReporter::new(sink)),
        OutputFormat::Summary => Arc::new(SummaryReporter::new(sink).hide_skip(config.hide_skip)),
    }
}
