//! Test failure details
//!
//! A [`TestFailure`] is the rejection reason recorded on a test report. It is
//! built from a caught panic, a returned error, or a completion handle that
//! was dropped without being signalled.

use serde::{Deserialize, Serialize};
use std::any::Any;
use thiserror::Error;

/// Where a failure came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The body panicked (including failed `assert!` macros)
    Panic,
    /// The body returned or signalled an error
    Error,
    /// A completion-handle body dropped its handle without signalling
    MissingCallbackUsage,
    /// The spawned task never produced a result
    Interrupted,
}

/// Location and backtrace recorded by the panic hook
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PanicCapture {
    pub location: Option<String>,
    pub backtrace: Option<String>,
}

/// Rejection reason of a single test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Error)]
#[error("{name}: {message}")]
pub struct TestFailure {
    pub kind: FailureKind,
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtrace: Option<String>,
}

impl TestFailure {
    /// Plain error failure with the given message
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Error, "Error", message)
    }

    fn new(kind: FailureKind, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            message: message.into(),
            operator: None,
            expected: None,
            actual: None,
            location: None,
            backtrace: None,
        }
    }

    /// Build a failure from an error returned or signalled by a test body.
    ///
    /// A `TestFailure` that travelled through `anyhow` is returned unchanged.
    pub fn from_error(err: anyhow::Error) -> Self {
        match err.downcast::<TestFailure>() {
            Ok(failure) => failure,
            Err(err) => Self::new(FailureKind::Error, "Error", format!("{err:#}")),
        }
    }

    /// Build a failure from a caught panic payload
    pub fn from_panic(payload: Box<dyn Any + Send>, capture: Option<PanicCapture>) -> Self {
        let text = panic_message(payload.as_ref());
        let capture = capture.unwrap_or_default();

        let mut failure = match parse_assertion(&text) {
            Some(assertion) => {
                let mut failure =
                    Self::new(FailureKind::Panic, "AssertionError", assertion.headline);
                failure.operator = Some(assertion.operator);
                failure.expected = assertion.expected;
                failure.actual = assertion.actual;
                failure
            }
            None if text.starts_with("assertion failed") => {
                Self::new(FailureKind::Panic, "AssertionError", text)
            }
            None => Self::new(FailureKind::Panic, "Panic", text),
        };

        failure.location = capture.location;
        failure.backtrace = capture.backtrace;
        failure
    }

    /// Failure for a completion handle that was dropped unsignalled
    pub fn missing_callback() -> Self {
        Self::new(
            FailureKind::MissingCallbackUsage,
            "MissingCallbackUsage",
            "completion handle was dropped without calling ok(), fail() or finish()",
        )
    }

    /// Failure for a body whose task was cancelled or lost
    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Interrupted, "Interrupted", message)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_expected(
        mut self,
        operator: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.operator = Some(operator.into());
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

struct Assertion {
    headline: String,
    operator: String,
    expected: Option<String>,
    actual: Option<String>,
}

/// Parse the message produced by `assert_eq!` / `assert_ne!`:
///
/// ```text
/// assertion `left == right` failed: optional message
///   left: 1
///  right: 2
/// ```
fn parse_assertion(text: &str) -> Option<Assertion> {
    let rest = text.strip_prefix("assertion `left ")?;
    let operator = rest.split_whitespace().next()?.to_string();

    let mut lines = text.lines();
    let headline = lines.next()?.to_string();
    let mut expected = None;
    let mut actual = None;

    for line in lines {
        if let Some(value) = line.strip_prefix("  left: ") {
            actual = Some(value.to_string());
        } else if let Some(value) = line.strip_prefix(" right: ") {
            expected = Some(value.to_string());
        }
    }

    Some(Assertion {
        headline,
        operator,
        expected,
        actual,
    })
}
