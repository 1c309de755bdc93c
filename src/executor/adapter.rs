//! Execution adapter
//!
//! Normalizes the three supported body styles into one contract: a [`Thunk`]
//! that, once invoked, yields a [`Settlement`] and never panics out.
//!
//! - [`TestBody::sync`]: a closure returning `()` or `Result<(), E>`
//! - [`TestBody::future`]: a closure returning a future of the same
//! - [`TestBody::callback`]: a closure receiving a one-shot [`Done`] handle

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;

use super::capture::{self, Captured};
use crate::models::{Settlement, TestFailure, TestKind};

type Outcome = Result<(), TestFailure>;

/// Values a test body may return
pub trait IntoOutcome {
    fn into_outcome(self) -> Result<(), TestFailure>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), TestFailure> {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_outcome(self) -> Result<(), TestFailure> {
        self.map_err(|e| TestFailure::from_error(e.into()))
    }
}

/// One-shot completion handle for callback-style bodies.
///
/// Consuming methods signal the outcome. Dropping the handle without calling
/// any of them fails the test with `MissingCallbackUsage`.
#[derive(Debug)]
pub struct Done {
    tx: Option<oneshot::Sender<Outcome>>,
}

impl Done {
    fn new() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn ok(mut self) {
        self.send(Ok(()));
    }

    pub fn fail<E: Into<anyhow::Error>>(mut self, err: E) {
        self.send(Err(TestFailure::from_error(err.into())));
    }

    /// Error-first completion: `None` passes, `Some(err)` fails
    pub fn finish<E: Into<anyhow::Error>>(self, err: Option<E>) {
        match err {
            None => self.ok(),
            Some(err) => self.fail(err),
        }
    }

    fn send(&mut self, outcome: Outcome) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(outcome);
        }
    }
}

type SyncFn<A> = Arc<dyn Fn(A) -> Outcome + Send + Sync>;
type AsyncFn<A> = Arc<dyn Fn(A) -> BoxFuture<'static, Outcome> + Send + Sync>;
type CallbackFn<A> = Arc<dyn Fn(A, Done) + Send + Sync>;

/// A registered test body, receiving the harness arguments `A`
pub enum TestBody<A> {
    Sync(SyncFn<A>),
    Async(AsyncFn<A>),
    Callback(CallbackFn<A>),
}

impl<A: 'static> TestBody<A> {
    pub fn sync<F, R>(f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        R: IntoOutcome,
    {
        TestBody::Sync(Arc::new(move |args| f(args).into_outcome()))
    }

    pub fn future<F, Fut, R>(f: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoOutcome + 'static,
    {
        TestBody::Async(Arc::new(move |args| {
            f(args).map(IntoOutcome::into_outcome).boxed()
        }))
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(A, Done) + Send + Sync + 'static,
    {
        TestBody::Callback(Arc::new(f))
    }

    /// Body that does nothing, used for title-only todo tests
    pub fn noop() -> Self {
        Self::sync(|_: A| {})
    }
}

impl<A> TestBody<A> {
    pub fn kind(&self) -> TestKind {
        match self {
            TestBody::Sync(_) => TestKind::Sync,
            TestBody::Async(_) | TestBody::Callback(_) => TestKind::Async,
        }
    }
}

impl<A> Clone for TestBody<A> {
    fn clone(&self) -> Self {
        match self {
            TestBody::Sync(f) => TestBody::Sync(f.clone()),
            TestBody::Async(f) => TestBody::Async(f.clone()),
            TestBody::Callback(f) => TestBody::Callback(f.clone()),
        }
    }
}

/// Deferred execution of one body with its arguments bound.
///
/// Nothing runs until [`Thunk::invoke`].
pub struct Thunk {
    future: BoxFuture<'static, Outcome>,
}

impl Thunk {
    /// Run the body on its own task and wait for its settlement.
    ///
    /// The task is detached if this future is dropped, so a started body
    /// always runs to completion.
    pub async fn invoke(self) -> Settlement {
        capture::install_hook();

        match tokio::spawn(Captured::new(self.future)).await {
            Ok(Ok(outcome)) => outcome.into(),
            Ok(Err(panicked)) => Settlement::Rejected(panicked),
            Err(join_error) => Settlement::Rejected(TestFailure::interrupted(join_error.to_string())),
        }
    }
}

/// Bind `args` to `body`
pub fn wrap<A: Send + 'static>(body: &TestBody<A>, args: A) -> Thunk {
    let future: BoxFuture<'static, Outcome> = match body {
        TestBody::Sync(f) => {
            let f = f.clone();
            async move { f(args) }.boxed()
        }
        TestBody::Async(f) => {
            let f = f.clone();
            async move { f(args).await }.boxed()
        }
        TestBody::Callback(f) => {
            let f = f.clone();
            async move {
                let (done, rx) = Done::new();
                f(args, done);
                rx.await.unwrap_or_else(|_| Err(TestFailure::missing_callback()))
            }
            .boxed()
        }
    };

    Thunk { future }
}
