//! Concurrent test execution
//!
//! Tests start in registration order with at most `fan_out` in flight.
//! Reports are slotted back by position so the returned list keeps
//! registration order whatever the completion order was.

use futures::stream::{self, StreamExt};
use tracing::debug;

use super::runner::Runner;
use crate::error::HarnessError;
use crate::models::TestReport;

impl<'h, A> Runner<'h, A>
where
    A: Clone + Send + Sync + 'static,
{
    pub(super) async fn run_concurrent(&self) -> Result<Vec<TestReport>, HarnessError> {
        let total = self.tests.len();
        let fan_out = self.config.fan_out(total);
        debug!("Running {} tests with fan-out {}", total, fan_out);

        let mut slots: Vec<Option<TestReport>> = vec![None; total];
        let mut settled = stream::iter(self.tests.iter().enumerate())
            .map(move |(slot, test)| async move { (slot, self.execute(test).await) })
            .buffer_unordered(fan_out);

        while let Some((slot, outcome)) = settled.next().await {
            // dropping the stream stops new tests; started bodies finish on their own tasks
            slots[slot] = Some(outcome?);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}
