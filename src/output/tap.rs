//! TAP version 13 reporter

use super::format::{diagnostic, Sink};
use crate::events::Listener;
use crate::models::{RunStats, TestReport};

/// Default reporter producing TAP 13 text
pub struct TapReporter {
    sink: Sink,
    show_stack: bool,
    hide_skip: bool,
}

impl TapReporter {
    pub fn new(sink: Sink) -> Self {
        Self {
            sink,
            show_stack: false,
            hide_skip: false,
        }
    }

    pub fn show_stack(mut self, show_stack: bool) -> Self {
        self.show_stack = show_stack;
        self
    }

    pub fn hide_skip(mut self, hide_skip: bool) -> Self {
        self.hide_skip = hide_skip;
        self
    }
}

impl Listener for TapReporter {
    fn on_header(&self, _stats: &RunStats) {
        self.sink.line("TAP version 13");
    }

    fn on_pass(&self, test: &TestReport) {
        self.sink.lines([
            format!("# :) {}", test.title),
            format!("ok {} - {}", test.index, test.title),
        ]);
    }

    fn on_fail(&self, test: &TestReport) {
        let mut lines = vec![
            format!("# :( {}", test.title),
            format!("not ok {} - {}", test.index, test.title),
        ];
        if let Some(reason) = &test.reason {
            lines.extend(diagnostic(reason, self.show_stack));
        }
        self.sink.lines(lines);
    }

    fn on_skip(&self, test: &TestReport) {
        if !self.hide_skip {
            self.sink
                .line(format!("ok {} - {} # SKIP", test.index, test.title));
        }
    }

    fn on_todo(&self, test: &TestReport) {
        // a failing todo is reported as `not ok` without counting as a failure
        let status = if test.reason.is_some() { "not ok" } else { "ok" };
        self.sink
            .line(format!("{status} {} - {} # TODO", test.index, test.title));
    }

    fn on_footer(&self, stats: &RunStats, aborted: bool) {
        let mut lines = vec![
            String::new(),
            format!("1..{}", stats.count),
            format!("# tests {}", stats.count),
            format!("# pass  {}", stats.pass),
        ];
        if stats.skip > 0 {
            lines.push(format!("# skip  {}", stats.skip));
        }
        if stats.todo > 0 {
            lines.push(format!("# todo  {}", stats.todo));
        }

        if stats.fail > 0 || aborted {
            lines.push(format!("# fail  {}", stats.fail));
            if aborted {
                lines.push("# aborted".to_string());
            }
            lines.push(String::new());
            lines.push("# not ok".to_string());
        } else {
            lines.push(String::new());
            lines.push("# ok".to_string());
        }
        self.sink.lines(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunOptions;
    use crate::harness::Harness;
    use crate::models::{Modifiers, TestFailure, TestKind};

    #[tokio::test]
    async fn test_full_run_output() {
        let (sink, buffer) = Sink::buffer();
        let mut harness = Harness::new();
        harness
            .add("one", |_| assert_eq!(1, 1))
            .skip("four (skip)", |_| {})
            .add("foo", |_| assert_eq!(55, 55));

        harness
            .run(RunOptions::new().serial(true).reporter(TapReporter::new(sink)))
            .await
            .unwrap();

        assert_eq!(
            buffer.contents(),
            "TAP version 13\n\
             # :) one\n\
             ok 1 - one\n\
             ok 2 - four (skip) # SKIP\n\
             # :) foo\n\
             ok 3 - foo\n\
             \n\
             1..3\n\
             # tests 3\n\
             # pass  2\n\
             # skip  1\n\
             \n\
             # ok\n"
        );
    }

    #[test]
    fn test_fail_block() {
        let (sink, buffer) = Sink::buffer();
        let reporter = TapReporter::new(sink);
        let report = TestReport::pending("bar", 2, TestKind::Sync, Modifiers::none()).settle(
            crate::models::Settlement::Rejected(
                TestFailure::message("1 is not 2").with_location("tests/bar.rs:3:5"),
            ),
            0,
        );

        reporter.on_fail(&report);

        let text = buffer.contents();
        assert!(text.starts_with("# :( bar\nnot ok 2 - bar\n  ---\n"));
        assert!(text.contains("  message: 1 is not 2\n"));
        assert!(text.contains("  at: tests/bar.rs:3:5\n"));
        assert!(text.ends_with("  ...\n"));
    }

    #[test]
    fn test_footer_with_failures() {
        let (sink, buffer) = Sink::buffer();
        let reporter = TapReporter::new(sink);
        let stats = RunStats {
            count: 4,
            pass: 3,
            fail: 1,
            ran: 4,
            ..Default::default()
        };

        reporter.on_footer(&stats, false);

        assert_eq!(
            buffer.contents(),
            "\n1..4\n# tests 4\n# pass  3\n# fail  1\n\n# not ok\n"
        );
    }

    #[test]
    fn test_hidden_skip_and_failing_todo() {
        let (sink, buffer) = Sink::buffer();
        let reporter = TapReporter::new(sink).hide_skip(true);

        let skipped = TestReport::pending("s", 1, TestKind::Sync, Modifiers::skip()).skipped();
        reporter.on_skip(&skipped);
        assert_eq!(buffer.contents(), "");

        let todo = TestReport::pending("t", 2, TestKind::Sync, Modifiers::todo()).todo(
            crate::models::Settlement::Rejected(TestFailure::message("aloha")),
            0,
        );
        reporter.on_todo(&todo);
        assert_eq!(buffer.contents(), "not ok 2 - t # TODO\n");
    }
}
