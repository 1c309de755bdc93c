//! Typed listener interface

use super::Event;
use crate::models::{RunStats, TestReport};

/// Observer with one hook per event kind.
///
/// All hooks default to no-ops. Reporters implement this trait and are
/// attached with [`EventBus::subscribe`](super::EventBus::subscribe), which
/// routes every event through [`Listener::on_event`].
pub trait Listener: Send + Sync {
    fn on_header(&self, _stats: &RunStats) {}
    fn on_before_each(&self, _test: &TestReport) {}
    fn on_test(&self, _test: &TestReport) {}
    fn on_after_each(&self, _test: &TestReport) {}
    fn on_pass(&self, _test: &TestReport) {}
    fn on_fail(&self, _test: &TestReport) {}
    fn on_skip(&self, _test: &TestReport) {}
    fn on_todo(&self, _test: &TestReport) {}
    fn on_footer(&self, _stats: &RunStats, _aborted: bool) {}

    /// Catch-all entry point; override to observe raw events
    fn on_event(&self, event: &Event) {
        dispatch(self, event);
    }
}

/// Route an event to the matching typed hook
pub fn dispatch<L: Listener + ?Sized>(listener: &L, event: &Event) {
    match event {
        Event::Header { stats } => listener.on_header(stats),
        Event::BeforeEach { test } => listener.on_before_each(test),
        Event::Test { test } => listener.on_test(test),
        Event::AfterEach { test } => listener.on_after_each(test),
        Event::Pass { test } => listener.on_pass(test),
        Event::Fail { test } => listener.on_fail(test),
        Event::Skip { test } => listener.on_skip(test),
        Event::Todo { test } => listener.on_todo(test),
        Event::Footer { stats, aborted } => listener.on_footer(stats, *aborted),
    }
}
