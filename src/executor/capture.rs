//! Panic capture for test bodies
//!
//! A process-wide panic hook records the location and backtrace of panics
//! raised while a [`Captured`] future is being polled. Panics elsewhere go to
//! the previous hook. Whether the backtrace is printed is up to the reporter.

use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Once;
use std::task::{Context, Poll};

use crate::models::{PanicCapture, TestFailure};

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicCapture>> = const { RefCell::new(None) };
}

static INSTALL: Once = Once::new();

/// Install the capturing hook once per process
pub fn install_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !CAPTURING.with(Cell::get) {
                previous(info);
                return;
            }

            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
            // independent of RUST_BACKTRACE; show_stack decides what is printed
            let backtrace = Some(Backtrace::force_capture().to_string());

            LAST_PANIC.with(|slot| {
                *slot.borrow_mut() = Some(PanicCapture {
                    location,
                    backtrace,
                })
            });
        }));
    });
}

/// Future adapter turning panics during `poll` into a [`TestFailure`]
pub struct Captured<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> Captured<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }
}

impl<F: Future> Future for Captured<F> {
    type Output = Result<F::Output, TestFailure>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = self.inner.as_mut();

        let previous = CAPTURING.with(|c| c.replace(true));
        let result = panic::catch_unwind(AssertUnwindSafe(|| inner.poll(cx)));
        CAPTURING.with(|c| c.set(previous));

        match result {
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Ok(Poll::Pending) => Poll::Pending,
            Err(payload) => {
                let capture = LAST_PANIC.with(|slot| slot.borrow_mut().take());
                Poll::Ready(Err(TestFailure::from_panic(payload, capture)))
            }
        }
    }
}
