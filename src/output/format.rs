//! Output format selection, writer sinks and failure diagnostics

use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::TestFailure;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// TAP version 13
    Tap,
    /// One JSON object per event
    Json,
    /// Human-readable status lines
    Summary,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tap" => Some(OutputFormat::Tap),
            "json" | "ndjson" => Some(OutputFormat::Json),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Shared line-oriented writer used by reporters.
///
/// Write errors are dropped; a reporter has nowhere to send them.
#[derive(Clone)]
pub struct Sink {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Sink {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// In-memory sink plus a handle to read what was written
    pub fn buffer() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (Self::from_writer(buffer.clone()), buffer)
    }

    /// Write several lines under one lock so concurrent reporters do not
    /// interleave inside a block
    pub fn lines<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        for line in lines {
            let _ = writeln!(writer, "{}", line.as_ref());
        }
        let _ = writer.flush();
    }

    pub fn line(&self, line: impl AsRef<str>) {
        self.lines([line]);
    }
}

/// Cloneable in-memory writer
#[derive(Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// YAML-ish diagnostic block printed under a failing TAP line
pub fn diagnostic(failure: &TestFailure, show_stack: bool) -> Vec<String> {
    let mut lines = vec!["  ---".to_string()];
    lines.push(format!("  name: {}", failure.name));

    let mut message = failure.message.lines();
    lines.push(format!("  message: {}", message.next().unwrap_or_default()));
    lines.extend(message.map(|line| format!("    {line}")));

    if let Some(expected) = &failure.expected {
        if let Some(operator) = &failure.operator {
            lines.push(format!("  operator: {operator}"));
        }
        lines.push(format!("  expected: {expected}"));
        lines.push(format!(
            "  actual:   {}",
            failure.actual.as_deref().unwrap_or_default()
        ));
    }

    if let Some(location) = &failure.location {
        lines.push(format!("  at: {location}"));
    }

    if show_stack {
        if let Some(backtrace) = &failure.backtrace {
            lines.push("  stack:".to_string());
            lines.extend(
                backtrace
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| format!("    {}", line.trim())),
            );
        }
    }

    lines.push("  ...".to_string());
    lines
}
