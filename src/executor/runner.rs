//! Test scheduler
//!
//! Drives every registered test through its lifecycle, updates the run
//! statistics and publishes events on the harness bus.

use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

use super::adapter::wrap;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::events::{Event, EventBus};
use crate::harness::TestDescriptor;
use crate::models::{RunStats, TestReport};
use crate::utils::Timer;

/// One run over a borrowed registry
pub struct Runner<'h, A> {
    pub(super) tests: &'h [TestDescriptor<A>],
    bus: &'h EventBus,
    pub(super) config: &'h HarnessConfig,
    args: &'h A,
    stats: Mutex<RunStats>,
}

impl<'h, A> Runner<'h, A>
where
    A: Clone + Send + Sync + 'static,
{
    pub fn new(
        tests: &'h [TestDescriptor<A>],
        bus: &'h EventBus,
        config: &'h HarnessConfig,
        args: &'h A,
        stats: RunStats,
    ) -> Self {
        Self {
            tests,
            bus,
            config,
            args,
            stats: Mutex::new(stats),
        }
    }

    /// Run every test and return the final statistics together with the
    /// reports in registration order, or the abort error.
    ///
    /// The statistics are returned even when the run aborts.
    pub async fn run(self) -> (RunStats, Result<Vec<TestReport>, HarnessError>) {
        self.update(RunStats::reset_run);
        let stats = self.snapshot();

        info!(
            "Starting run of {} tests ({})",
            stats.count,
            if self.config.serial {
                "serial".to_string()
            } else {
                format!("fan-out {}", self.config.fan_out(stats.count))
            }
        );
        self.bus.emit(&Event::Header { stats });

        let outcome = if self.config.serial {
            self.run_serial().await
        } else {
            self.run_concurrent().await
        };

        let stats = self.snapshot();
        let aborted = outcome.is_err();
        self.bus.emit(&Event::Footer { stats, aborted });

        match &outcome {
            Ok(_) => info!(
                "Run completed - Pass: {}/{} ({:.1}%)",
                stats.pass,
                stats.ran,
                stats.pass_rate()
            ),
            Err(err) => warn!("{}", err),
        }

        (stats, outcome)
    }

    async fn run_serial(&self) -> Result<Vec<TestReport>, HarnessError> {
        let mut results = Vec::with_capacity(self.tests.len());
        for test in self.tests {
            results.push(self.execute(test).await?);
        }
        Ok(results)
    }

    /// Drive one test from pending to its terminal state
    pub(super) async fn execute(
        &self,
        test: &TestDescriptor<A>,
    ) -> Result<TestReport, HarnessError> {
        let pending = test.report();
        self.bus.emit(&Event::BeforeEach {
            test: pending.clone(),
        });

        // a skipped test never enters the running state
        let modifiers = test.modifiers();
        if modifiers.skip {
            self.bus.emit(&Event::Test {
                test: pending.clone(),
            });
            let report = pending.skipped();
            self.bus.emit(&Event::Skip {
                test: report.clone(),
            });
            self.bus.emit(&Event::AfterEach {
                test: report.clone(),
            });
            return Ok(report);
        }

        let running = pending.running();
        self.bus.emit(&Event::Test {
            test: running.clone(),
        });

        debug!(index = test.index(), title = %test.title(), "invoking test body");
        let timer = Timer::start(test.title());
        let settlement = wrap(test.body(), self.args.clone()).invoke().await;
        let elapsed = timer.stop();
        self.update(|stats| stats.ran += 1);

        if modifiers.todo {
            let report = running.todo(settlement, elapsed);
            self.bus.emit(&Event::Todo {
                test: report.clone(),
            });
            self.bus.emit(&Event::AfterEach {
                test: report.clone(),
            });
            return Ok(report);
        }

        let report = running.settle(settlement, elapsed);
        self.bus.emit(&Event::AfterEach {
            test: report.clone(),
        });

        match &report.reason {
            None => {
                self.update(|stats| stats.pass += 1);
                self.bus.emit(&Event::Pass {
                    test: report.clone(),
                });
            }
            Some(reason) => {
                self.update(|stats| stats.fail += 1);
                self.bus.emit(&Event::Fail {
                    test: report.clone(),
                });

                if !self.config.settle {
                    return Err(HarnessError::RunAbort {
                        index: report.index,
                        title: report.title.clone(),
                        reason: reason.clone(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn update(&self, f: impl FnOnce(&mut RunStats)) {
        f(&mut self.stats.lock().unwrap_or_else(PoisonError::into_inner));
    }

    fn snapshot(&self) -> RunStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
