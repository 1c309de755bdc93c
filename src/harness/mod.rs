//! The harness: registration API and run entry point
//!
//! ```no_run
//! use tapkit::{Harness, RunOptions};
//!
//! # async fn demo() -> Result<(), tapkit::HarnessError> {
//! let mut harness = Harness::new();
//! harness
//!     .add("one", |_| assert_eq!(1, 1))
//!     .add_async("later", |_| async { tokio::task::yield_now().await })
//!     .add_callback("done", |_, done| done.ok());
//!
//! let summary = harness.run(RunOptions::new().serial(true)).await?;
//! std::process::exit(summary.exit_code() as i32);
//! # }
//! ```

mod registry;

pub use registry::{declared_name, Registry, TestDescriptor, TestSpec, Title};

use chrono::Utc;
use std::future::Future;
use tracing::debug;

use crate::config::{HarnessConfig, RunOptions};
use crate::error::HarnessError;
use crate::events::EventBus;
use crate::executor::{Done, IntoOutcome, Runner, TestBody};
use crate::models::{Modifiers, RunStats, RunSummary};
use crate::output::{self, Sink};
use crate::utils::Timer;

/// Test harness holding registered tests, their event bus and statistics.
///
/// `A` is the value injected into every test body; it is cloned per test.
pub struct Harness<A = ()> {
    registry: Registry<A>,
    bus: EventBus,
    stats: RunStats,
    config: HarnessConfig,
    args: A,
}

impl Harness<()> {
    pub fn new() -> Self {
        Self::with_args(())
    }
}

impl Default for Harness<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Harness<A>
where
    A: Clone + Send + Sync + 'static,
{
    /// Create a harness that passes `args` to every test body
    pub fn with_args(args: A) -> Self {
        Self {
            registry: Registry::new(),
            bus: EventBus::new(),
            stats: RunStats::default(),
            config: HarnessConfig::default(),
            args,
        }
    }

    /// Merge options into the stored configuration
    pub fn option(&mut self, options: &RunOptions) -> &mut Self {
        self.config.merge(options);
        self
    }

    pub fn set_config(&mut self, config: HarnessConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Event bus for custom listeners
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Hand the harness to an extension that registers listeners or tests
    pub fn use_plugin(&mut self, plugin: impl FnOnce(&mut Self)) -> &mut Self {
        plugin(self);
        self
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn tests(&self) -> &[TestDescriptor<A>] {
        self.registry.tests()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Register a test from a builder; fails when it carries no body
    pub fn register(&mut self, spec: TestSpec<A>) -> Result<&mut Self, HarnessError> {
        let test = self.registry.register(spec, &mut self.stats)?;
        debug!(index = test.index(), title = %test.title(), kind = %test.kind(), "registered test");
        Ok(self)
    }

    /// Register a synchronous test
    pub fn add<F, R>(&mut self, title: impl Into<Title>, f: F) -> &mut Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.insert(TestSpec::new().title(title).sync(f))
    }

    /// Register a test returning a future
    pub fn add_async<F, Fut, R>(&mut self, title: impl Into<Title>, f: F) -> &mut Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoOutcome + 'static,
    {
        self.insert(TestSpec::new().title(title).future(f))
    }

    /// Register a test that signals completion through a [`Done`] handle
    pub fn add_callback<F>(&mut self, title: impl Into<Title>, f: F) -> &mut Self
    where
        F: Fn(A, Done) + Send + Sync + 'static,
    {
        self.insert(TestSpec::new().title(title).callback(f))
    }

    /// Register a prebuilt body with explicit modifiers
    pub fn add_test(
        &mut self,
        title: impl Into<Title>,
        body: TestBody<A>,
        modifiers: Modifiers,
    ) -> &mut Self {
        self.insert(TestSpec::new().title(title).body(body).modifiers(modifiers))
    }

    /// Register a test whose body is never run
    pub fn skip<F, R>(&mut self, title: impl Into<Title>, f: F) -> &mut Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        self.insert(TestSpec::new().title(title).sync(f).skip())
    }

    /// Register a placeholder todo test
    pub fn todo(&mut self, title: impl Into<Title>) -> &mut Self {
        self.insert(TestSpec::new().title(title).body(TestBody::noop()).todo())
    }

    fn insert(&mut self, spec: TestSpec<A>) -> &mut Self {
        // every caller supplies a body, so registration cannot fail here
        if let Err(err) = self.registry.register(spec, &mut self.stats) {
            debug!(error = %err, "registration rejected");
        }
        self
    }

    /// Run every registered test.
    ///
    /// `options` are merged into the stored configuration first. The
    /// reporter from `options` (or the one selected by the configured output
    /// format) is attached for the duration of the run only. Returns
    /// [`HarnessError::RunAbort`] when `settle` is off and a test fails.
    pub async fn run(&mut self, options: RunOptions) -> Result<RunSummary, HarnessError> {
        self.config.merge(&options);

        let reporter = options
            .selected_reporter()
            .unwrap_or_else(|| output::reporter_for(&self.config, Sink::stdout()));
        let subscription = self.bus.subscribe(reporter);

        let started_at = Utc::now();
        let timer = Timer::start("run");

        let runner = Runner::new(
            self.registry.tests(),
            &self.bus,
            &self.config,
            &self.args,
            self.stats,
        );
        let (stats, outcome) = runner.run().await;

        self.stats = stats;
        self.bus.off(subscription);

        let results = outcome?;
        Ok(RunSummary::new(started_at, timer.stop(), stats, results))
    }
}
