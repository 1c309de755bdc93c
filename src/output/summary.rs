//! Human-readable summary reporter

use super::format::Sink;
use crate::events::Listener;
use crate::models::{RunStats, TestReport};

/// One status line per settled test followed by a totals block
pub struct SummaryReporter {
    sink: Sink,
    hide_skip: bool,
}

impl SummaryReporter {
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            hide_skip: false,
        }
    }

    pub fn hide_skip(mut self, hide_skip: bool) -> Self {
        self.hide_skip = hide_skip;
        self
    }

    fn result(&self, test: &TestReport) {
        self.sink.line(format!(
            "{:>3}. {} {:<40} [{:>6}ms]",
            test.index,
            test.status.symbol(),
            test.title,
            test.duration_ms
        ));
        if let Some(reason) = &test.reason {
            self.sink.line(format!("       {reason}"));
        }
    }
}

impl Listener for SummaryReporter {
    fn on_pass(&self, test: &TestReport) {
        self.result(test);
    }

    fn on_fail(&self, test: &TestReport) {
        self.result(test);
    }

    fn on_skip(&self, test: &TestReport) {
        if !self.hide_skip {
            self.result(test);
        }
    }

    fn on_todo(&self, test: &TestReport) {
        self.result(test);
    }

    fn on_footer(&self, stats: &RunStats, aborted: bool) {
        self.sink.lines([
            "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".to_string(),
            format!(
                "Total: {} | Ran: {} | Pass: {} | Fail: {} | Skip: {} | Todo: {}",
                stats.count, stats.ran, stats.pass, stats.fail, stats.skip, stats.todo
            ),
            format!(
                "Pass Rate: {:.1}%{}",
                stats.pass_rate(),
                if aborted { " | aborted" } else { "" }
            ),
        ]);
    }
}
