//! Run statistics and summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{TestReport, TestStatus};

/// Aggregate counters for one harness.
///
/// `count`, `anonymous`, `skip` and `todo` are set at registration time;
/// `pass`, `fail` and `ran` start from zero on every run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub count: usize,
    pub pass: usize,
    pub fail: usize,
    pub anonymous: usize,
    pub skip: usize,
    pub todo: usize,
    pub ran: usize,
}

impl RunStats {
    pub(crate) fn reset_run(&mut self) {
        self.pass = 0;
        self.fail = 0;
        self.ran = 0;
    }

    pub fn is_ok(&self) -> bool {
        self.fail == 0
    }

    pub fn pass_rate(&self) -> f64 {
        let settled = self.pass + self.fail;
        if settled == 0 {
            0.0
        } else {
            (self.pass as f64 / settled as f64) * 100.0
        }
    }
}

/// Result of a run that was not aborted
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub stats: RunStats,
    pub results: Vec<TestReport>,
}

impl RunSummary {
    pub fn new(
        started_at: DateTime<Utc>,
        duration_ms: u64,
        stats: RunStats,
        results: Vec<TestReport>,
    ) -> Self {
        Self {
            started_at,
            duration_ms,
            stats,
            results,
        }
    }

    /// Process exit status: 0 when nothing failed, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.stats.is_ok() {
            0
        } else {
            1
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestReport> {
        self.results
            .iter()
            .filter(|r| r.status == TestStatus::Rejected)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run started {}", self.started_at.to_rfc3339())?;
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        for result in &self.results {
            writeln!(f, "  {result}")?;
        }
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(
            f,
            "Total: {} | Pass: {} | Fail: {} | Skip: {} | Todo: {}",
            self.stats.count, self.stats.pass, self.stats.fail, self.stats.skip, self.stats.todo
        )?;
        writeln!(
            f,
            "Pass Rate: {:.1}% | Duration: {}ms",
            self.stats.pass_rate(),
            self.duration_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Modifiers, Settlement, TestFailure, TestKind};

    fn summary(stats: RunStats) -> RunSummary {
        let results = vec![
            TestReport::pending("one", 1, TestKind::Sync, Modifiers::none())
                .settle(Settlement::Fulfilled, 1),
            TestReport::pending("bar", 2, TestKind::Sync, Modifiers::none())
                .settle(Settlement::Rejected(TestFailure::message("1 != 2")), 1),
        ];
        RunSummary::new(Utc::now(), 5, stats, results)
    }

    #[test]
    fn test_exit_code() {
        let passing = RunStats {
            count: 2,
            pass: 2,
            ..Default::default()
        };
        assert_eq!(summary(passing).exit_code(), 0);

        let failing = RunStats {
            count: 2,
            pass: 1,
            fail: 1,
            ..Default::default()
        };
        assert_eq!(summary(failing).exit_code(), 1);
    }

    #[test]
    fn test_failures_iterator() {
        let s = summary(RunStats::default());
        let failed: Vec<_> = s.failures().map(|r| r.title.as_str()).collect();
        assert_eq!(failed, vec!["bar"]);
    }

    #[test]
    fn test_reset_run_keeps_registration_counters() {
        let mut stats = RunStats {
            count: 4,
            pass: 3,
            fail: 1,
            anonymous: 1,
            skip: 1,
            todo: 0,
            ran: 4,
        };
        stats.reset_run();

        assert_eq!(stats.count, 4);
        assert_eq!(stats.anonymous, 1);
        assert_eq!(stats.skip, 1);
        assert_eq!((stats.pass, stats.fail, stats.ran), (0, 0, 0));
    }

    #[test]
    fn test_pass_rate() {
        let stats = RunStats {
            pass: 3,
            fail: 1,
            ..Default::default()
        };
        assert_eq!(stats.pass_rate(), 75.0);
        assert_eq!(RunStats::default().pass_rate(), 0.0);
    }
}
