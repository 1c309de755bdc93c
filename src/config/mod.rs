//! Configuration module
//!
//! [`HarnessConfig`] holds resolved settings; [`RunOptions`] is a partial
//! override where only explicitly set keys win. Values are layered as
//! defaults < config file < environment < command line < options passed to
//! `run`.

mod env;
mod file;

pub use env::{EnvBuilder, EnvConfig, EnvGuard};
pub use file::ConfigFile;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::events::Listener;
use crate::output::OutputFormat;

/// Resolved harness settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Run tests one at a time in registration order
    pub serial: bool,

    /// Keep going after a failure instead of aborting the run
    pub settle: bool,

    /// Include backtraces in failure diagnostics
    pub show_stack: bool,

    /// Leave skipped tests out of reporter output
    pub hide_skip: bool,

    /// Maximum tests in flight when not serial; `None` is unbounded
    pub concurrency: Option<usize>,

    /// Default reporter format
    pub format: OutputFormat,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            serial: false,
            settle: true,
            show_stack: false,
            hide_skip: false,
            concurrency: None,
            format: OutputFormat::Tap,
        }
    }
}

impl HarnessConfig {
    /// Apply every key that is set in `options`
    pub fn merge(&mut self, options: &RunOptions) {
        if let Some(serial) = options.serial {
            self.serial = serial;
        }
        if let Some(settle) = options.settle {
            self.settle = settle;
        }
        if let Some(show_stack) = options.show_stack {
            self.show_stack = show_stack;
        }
        if let Some(hide_skip) = options.hide_skip {
            self.hide_skip = hide_skip;
        }
        if let Some(concurrency) = options.concurrency {
            self.concurrency = Some(concurrency.max(1));
        }
        if let Some(format) = options.format {
            self.format = format;
        }
    }

    pub fn merged(&self, options: &RunOptions) -> Self {
        let mut config = self.clone();
        config.merge(options);
        config
    }

    /// Effective fan-out for `total` tests
    pub fn fan_out(&self, total: usize) -> usize {
        if self.serial {
            1
        } else {
            self.concurrency.unwrap_or(total).max(1)
        }
    }
}

/// Per-run overrides
#[derive(Clone, Default)]
pub struct RunOptions {
    pub serial: Option<bool>,
    pub settle: Option<bool>,
    pub show_stack: Option<bool>,
    pub hide_skip: Option<bool>,
    pub concurrency: Option<usize>,
    pub format: Option<OutputFormat>,
    reporter: Option<Arc<dyn Listener>>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serial(mut self, serial: bool) -> Self {
        self.serial = Some(serial);
        self
    }

    pub fn settle(mut self, settle: bool) -> Self {
        self.settle = Some(settle);
        self
    }

    pub fn show_stack(mut self, show_stack: bool) -> Self {
        self.show_stack = Some(show_stack);
        self
    }

    pub fn hide_skip(mut self, hide_skip: bool) -> Self {
        self.hide_skip = Some(hide_skip);
        self
    }

    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Replace the default reporter for this run
    pub fn reporter(self, reporter: impl Listener + 'static) -> Self {
        self.reporter_arc(Arc::new(reporter))
    }

    pub fn reporter_arc(mut self, reporter: Arc<dyn Listener>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Reporter chosen for this run, if any
    pub fn selected_reporter(&self) -> Option<Arc<dyn Listener>> {
        self.reporter.clone()
    }

    /// Layer `other` on top of `self`; keys set in `other` win
    pub fn overlay(mut self, other: RunOptions) -> Self {
        self.serial = other.serial.or(self.serial);
        self.settle = other.settle.or(self.settle);
        self.show_stack = other.show_stack.or(self.show_stack);
        self.hide_skip = other.hide_skip.or(self.hide_skip);
        self.concurrency = other.concurrency.or(self.concurrency);
        self.format = other.format.or(self.format);
        self.reporter = other.reporter.or(self.reporter);
        self
    }
}

impl fmt::Debug for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunOptions")
            .field("serial", &self.serial)
            .field("settle", &self.settle)
            .field("show_stack", &self.show_stack)
            .field("hide_skip", &self.hide_skip)
            .field("concurrency", &self.concurrency)
            .field("format", &self.format)
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}
