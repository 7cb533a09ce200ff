use chrono::{Local, NaiveDate};
use core::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Time source for the scheduler loop.
pub trait Clock: Send + Sync {
    /// Monotonic time, used to measure how long a pass took.
    fn now(&self) -> Instant;

    /// The calendar date relative report dates are resolved against.
    fn today(&self) -> NaiveDate;

    /// Sleep for `duration` unless `stop` fires first.
    ///
    /// Returns `true` if the full duration elapsed.
    fn sleep(&self, duration: Duration, stop: &CancellationToken) -> impl Future<Output = bool> + Send;
}

/// Wall clock backed by the tokio timer, so paused test time applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock {
    pinned_today: Option<NaiveDate>,
}

impl TokioClock {
    /// A clock whose calendar date never changes.
    #[must_use]
    pub const fn pinned(today: NaiveDate) -> Self {
        Self {
            pinned_today: Some(today),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn today(&self) -> NaiveDate {
        self.pinned_today.unwrap_or_else(|| Local::now().date_naive())
    }

    async fn sleep(&self, duration: Duration, stop: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            () = stop.cancelled() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }
}
