use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::{CancellationSignal, EventReporter};

/// Error type returned by units of work.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The service's business logic, split into cancellable units.
///
/// A unit of work must not run longer than the poll interval without calling
/// [`CancellationSignal::check_in`].
#[async_trait]
pub trait Work
where
    Self: Send + 'static,
{
    /// Prepare resources before the service reports `Running`.
    async fn initialize(&mut self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Perform one unit of work.
    async fn run_once(&mut self, signal: &CancellationSignal) -> Result<(), BoxError>;
}

/// Placeholder work that idles for one poll interval per unit.
#[derive(Clone, Copy, Debug)]
pub struct IdleWork {
    interval: Duration,
}

impl IdleWork {
    /// Idle for `interval` per unit.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl Work for IdleWork {
    async fn run_once(&mut self, _signal: &CancellationSignal) -> Result<(), BoxError> {
        tokio::time::sleep(self.interval).await;

        Ok(())
    }
}

/// Runs units of work until the cancellation signal is observed.
pub struct WorkerLoop<W> {
    events: EventReporter,
    work: W,
}

impl<W: Work> WorkerLoop<W> {
    /// Create a loop over `work`.
    pub const fn new(work: W, events: EventReporter) -> Self {
        Self { events, work }
    }

    /// Run until `signal` is set, checking it between units. Returns the
    /// number of units performed.
    ///
    /// A failed unit is reported as a warning and the loop carries on.
    pub async fn run(&mut self, signal: &CancellationSignal) -> u64 {
        let mut iterations = 0;

        while signal.check_in().is_ok() {
            if let Err(e) = self.work.run_once(signal).await {
                self.events.warning(format!("Unit of work failed: {e}"));
            }

            iterations += 1;
        }

        info!(iterations, "worker loop observed stop request");

        iterations
    }

    /// Give the work back.
    pub fn into_inner(self) -> W {
        self.work
    }
}
