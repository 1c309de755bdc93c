//! Per-test state models
//!
//! Defines test kinds, modifiers, the settlement produced by running a body,
//! and the [`TestReport`] payload carried by lifecycle events.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TestFailure;

/// How a test body signals completion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    /// Returns a value directly
    Sync,
    /// Returns a future or receives a completion handle
    Async,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestKind::Sync => write!(f, "sync"),
            TestKind::Async => write!(f, "async"),
        }
    }
}

/// Registration-time modifiers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub skip: bool,
    pub todo: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn skip() -> Self {
        Self {
            skip: true,
            todo: false,
        }
    }

    pub fn todo() -> Self {
        Self {
            skip: false,
            todo: true,
        }
    }
}

/// Lifecycle state of a test within a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pending,
    Running,
    Fulfilled,
    Rejected,
    Skipped,
    Todo,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Pending => "·",
            TestStatus::Running => "…",
            TestStatus::Fulfilled => "✓",
            TestStatus::Rejected => "✗",
            TestStatus::Skipped => "○",
            TestStatus::Todo => "◌",
        }
    }

    /// Whether no further transition can happen
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TestStatus::Pending | TestStatus::Running)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Pending => write!(f, "PENDING"),
            TestStatus::Running => write!(f, "RUNNING"),
            TestStatus::Fulfilled => write!(f, "PASS"),
            TestStatus::Rejected => write!(f, "FAIL"),
            TestStatus::Skipped => write!(f, "SKIP"),
            TestStatus::Todo => write!(f, "TODO"),
        }
    }
}

/// Final outcome of one body execution
#[derive(Clone, Debug, PartialEq)]
pub enum Settlement {
    Fulfilled,
    Rejected(TestFailure),
}

impl Settlement {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settlement::Fulfilled)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Settlement::Rejected(_))
    }

    pub fn reason(&self) -> Option<&TestFailure> {
        match self {
            Settlement::Fulfilled => None,
            Settlement::Rejected(reason) => Some(reason),
        }
    }
}

impl From<Result<(), TestFailure>> for Settlement {
    fn from(result: Result<(), TestFailure>) -> Self {
        match result {
            Ok(()) => Settlement::Fulfilled,
            Err(reason) => Settlement::Rejected(reason),
        }
    }
}

/// Snapshot of a test handed to listeners.
///
/// Every transition produces a new value; reports already emitted are never
/// touched again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub title: String,
    pub index: usize,
    pub kind: TestKind,
    pub modifiers: Modifiers,
    pub status: TestStatus,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<TestFailure>,
    pub duration_ms: u64,
}

impl TestReport {
    pub fn pending(
        title: impl Into<String>,
        index: usize,
        kind: TestKind,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            title: title.into(),
            index,
            kind,
            modifiers,
            status: TestStatus::Pending,
            ok: false,
            reason: None,
            duration_ms: 0,
        }
    }

    pub fn running(&self) -> Self {
        Self {
            status: TestStatus::Running,
            ..self.clone()
        }
    }

    /// Skipped tests never run and always count as ok
    pub fn skipped(&self) -> Self {
        Self {
            status: TestStatus::Skipped,
            ok: true,
            ..self.clone()
        }
    }

    /// Todo tests keep their failure for diagnostics but stay ok
    pub fn todo(&self, settlement: Settlement, duration_ms: u64) -> Self {
        let reason = match settlement {
            Settlement::Fulfilled => None,
            Settlement::Rejected(reason) => Some(reason),
        };
        Self {
            status: TestStatus::Todo,
            ok: true,
            reason,
            duration_ms,
            ..self.clone()
        }
    }

    /// Merge a settlement into a new report
    pub fn settle(&self, settlement: Settlement, duration_ms: u64) -> Self {
        match settlement {
            Settlement::Fulfilled => Self {
                status: TestStatus::Fulfilled,
                ok: true,
                reason: None,
                duration_ms,
                ..self.clone()
            },
            Settlement::Rejected(reason) => Self {
                status: TestStatus::Rejected,
                ok: false,
                reason: Some(reason),
                duration_ms,
                ..self.clone()
            },
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.status == TestStatus::Rejected
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}. {} [{}ms]",
            self.status.symbol(),
            self.index,
            self.title,
            self.duration_ms
        )?;
        if let Some(reason) = &self.reason {
            write!(f, " - {reason}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> TestReport {
        TestReport::pending("one", 1, TestKind::Sync, Modifiers::none())
    }

    #[test]
    fn test_settle_fulfilled() {
        let pending = report();
        let settled = pending.running().settle(Settlement::Fulfilled, 12);

        assert_eq!(settled.status, TestStatus::Fulfilled);
        assert!(settled.ok);
        assert_eq!(settled.duration_ms, 12);
        // the original value is untouched
        assert_eq!(pending.status, TestStatus::Pending);
        assert!(!pending.ok);
    }

    #[test]
    fn test_settle_rejected() {
        let settled = report().settle(Settlement::Rejected(TestFailure::message("nope")), 3);

        assert!(settled.is_rejected());
        assert!(!settled.ok);
        assert_eq!(settled.reason.as_ref().map(|r| r.message.as_str()), Some("nope"));
        assert!(settled.to_string().contains("Error: nope"));
    }

    #[test]
    fn test_todo_absorbs_failure() {
        let todo = TestReport::pending("later", 2, TestKind::Sync, Modifiers::todo())
            .todo(Settlement::Rejected(TestFailure::message("aloha")), 0);

        assert_eq!(todo.status, TestStatus::Todo);
        assert!(todo.ok);
        assert!(todo.reason.is_some());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!TestStatus::Pending.is_terminal());
        assert!(!TestStatus::Running.is_terminal());
        assert!(TestStatus::Skipped.is_terminal());
        assert!(TestStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_settlement_from_result() {
        let ok: Settlement = Ok(()).into();
        assert!(ok.is_fulfilled());

        let err: Settlement = Err(TestFailure::message("x")).into();
        assert!(err.is_rejected());
        assert_eq!(err.reason().map(|r| r.message.as_str()), Some("x"));
    }
}
