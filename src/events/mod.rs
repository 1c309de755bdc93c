//! Lifecycle events
//!
//! The scheduler publishes [`Event`]s on an [`EventBus`]; reporters and any
//! other observers subscribe either per [`EventKind`] or with a catch-all
//! [`Listener`].

mod bus;
mod listener;

pub use bus::{EventBus, SubscriptionId};
pub use listener::{dispatch, Listener};

use serde::Serialize;
use std::fmt;

use crate::models::{RunStats, TestReport};

/// Event emitted during a run
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Event {
    /// Once, before any test executes
    Header { stats: RunStats },
    BeforeEach { test: TestReport },
    Test { test: TestReport },
    AfterEach { test: TestReport },
    Pass { test: TestReport },
    Fail { test: TestReport },
    Skip { test: TestReport },
    Todo { test: TestReport },
    /// Once, after the last settlement or the abort
    Footer { stats: RunStats, aborted: bool },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Header { .. } => EventKind::Header,
            Event::BeforeEach { .. } => EventKind::BeforeEach,
            Event::Test { .. } => EventKind::Test,
            Event::AfterEach { .. } => EventKind::AfterEach,
            Event::Pass { .. } => EventKind::Pass,
            Event::Fail { .. } => EventKind::Fail,
            Event::Skip { .. } => EventKind::Skip,
            Event::Todo { .. } => EventKind::Todo,
            Event::Footer { .. } => EventKind::Footer,
        }
    }

    /// Test payload for per-test events
    pub fn test(&self) -> Option<&TestReport> {
        match self {
            Event::BeforeEach { test }
            | Event::Test { test }
            | Event::AfterEach { test }
            | Event::Pass { test }
            | Event::Fail { test }
            | Event::Skip { test }
            | Event::Todo { test } => Some(test),
            Event::Header { .. } | Event::Footer { .. } => None,
        }
    }
}

/// Event discriminant used for subscriptions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Header,
    BeforeEach,
    Test,
    AfterEach,
    Pass,
    Fail,
    Skip,
    Todo,
    Footer,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Header => "header",
            EventKind::BeforeEach => "beforeEach",
            EventKind::Test => "test",
            EventKind::AfterEach => "afterEach",
            EventKind::Pass => "pass",
            EventKind::Fail => "fail",
            EventKind::Skip => "skip",
            EventKind::Todo => "todo",
            EventKind::Footer => "footer",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
