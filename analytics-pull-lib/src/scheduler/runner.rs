use super::{AuthPolicy, Clock, ReportSettings, TokioClock};
use crate::emit::{Emitter, OutputQueue};
use crate::report::{CredentialProvider, Fetcher, ReportError};
use crate::transform::expand;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

pub(super) const LOG_TARGET: &str = " scheduler";

/// Where a scheduler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running(NaiveDate),
    Sleeping,
    Stopped,
}

/// Counters accumulated over the lifetime of a scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Passes that completed, possibly with skipped dates.
    pub passes: u64,

    /// Passes aborted by a credential failure.
    pub failed_passes: u64,

    pub records_emitted: u64,
    pub skipped_dates: u64,

    /// Passes that took longer than the interval.
    pub overruns: u64,
}

/// Pulls one report's date range, once or on a fixed interval, until stopped.
#[derive(Debug)]
pub struct Scheduler<P, Q, C = TokioClock> {
    settings: ReportSettings,
    provider: P,
    emitter: Emitter<Q>,
    clock: C,
    stop: CancellationToken,
    state: SchedulerState,
    summary: RunSummary,
}

impl<P: CredentialProvider, Q: OutputQueue> Scheduler<P, Q, TokioClock> {
    /// Create a scheduler driven by the wall clock.
    ///
    /// Fails with [`ReportError::InvalidConfig`] if the settings are unusable.
    pub fn new(settings: ReportSettings, provider: P, queue: Q, stop: CancellationToken) -> Result<Self, ReportError> {
        Self::with_clock(settings, provider, queue, stop, TokioClock::default())
    }
}

impl<P: CredentialProvider, Q: OutputQueue, C: Clock> Scheduler<P, Q, C> {
    pub fn with_clock(settings: ReportSettings, provider: P, queue: Q, stop: CancellationToken, clock: C) -> Result<Self, ReportError> {
        settings.validate(clock.today())?;

        let emitter = Emitter::new(queue, settings.event_type.clone());
        Ok(Self {
            settings,
            provider,
            emitter,
            clock,
            stop,
            state: SchedulerState::Idle,
            summary: RunSummary::default(),
        })
    }

    #[must_use]
    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    #[must_use]
    pub const fn summary(&self) -> RunSummary {
        self.summary
    }

    #[must_use]
    pub const fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn into_queue(self) -> Q {
        self.emitter.into_queue()
    }

    /// Run passes until the schedule ends, the stop token fires, or a pass fails fatally.
    ///
    /// Without an interval exactly one pass is made. The scheduler is always
    /// [`SchedulerState::Stopped`] when this returns.
    pub async fn run(&mut self) -> Result<RunSummary, ReportError> {
        let result = self.run_loop().await;
        self.state = SchedulerState::Stopped;

        log::info!(
            target: LOG_TARGET,
            "Scheduler for {} stopped after {} passes ({} failed), {} records emitted, {} dates skipped",
            self.settings.view_id,
            self.summary.passes,
            self.summary.failed_passes,
            self.summary.records_emitted,
            self.summary.skipped_dates
        );

        result.map(|()| self.summary)
    }

    async fn run_loop(&mut self) -> Result<(), ReportError> {
        loop {
            if self.stop.is_cancelled() {
                log::info!(target: LOG_TARGET, "Stop requested for {}", self.settings.view_id);
                return Ok(());
            }

            let started = self.clock.now();

            match self.run_pass().await {
                Ok(()) => self.summary.passes += 1,
                Err(e @ ReportError::Auth(_)) if self.settings.auth_policy == AuthPolicy::Retry && self.settings.interval.is_some() => {
                    self.summary.failed_passes += 1;
                    log::error!(
                        target: LOG_TARGET,
                        "Pass for {} aborted, fresh credentials will be requested next cycle: {e}",
                        self.settings.view_id
                    );
                }
                Err(e) => {
                    self.summary.failed_passes += 1;
                    log::error!(target: LOG_TARGET, "Pass for {} aborted: {e}", self.settings.view_id);
                    return Err(e);
                }
            }

            let Some(interval) = self.settings.interval else {
                return Ok(());
            };

            let elapsed = self.clock.now().saturating_duration_since(started);
            match interval.checked_sub(elapsed) {
                Some(remaining) if !remaining.is_zero() => {
                    log::debug!(target: LOG_TARGET, "Sleeping {remaining:?} before the next pass for {}", self.settings.view_id);
                    self.state = SchedulerState::Sleeping;
                    if !self.clock.sleep(remaining, &self.stop).await {
                        log::info!(target: LOG_TARGET, "Stop requested for {} while sleeping", self.settings.view_id);
                        return Ok(());
                    }
                }
                _ => {
                    self.summary.overruns += 1;
                    log::warn!(
                        target: LOG_TARGET,
                        "Pass for {} took {elapsed:?}, longer than the {interval:?} interval; starting the next pass immediately",
                        self.settings.view_id
                    );
                }
            }
        }
    }

    async fn run_pass(&mut self) -> Result<(), ReportError> {
        let fetcher = Fetcher::new(self.provider.client().await?);
        let (start, end) = self.settings.date_range(self.clock.today())?;

        log::info!(target: LOG_TARGET, "Pulling {} for {start}..={end}", self.settings.view_id);

        for date in start.iter_days().take_while(|date| *date <= end) {
            if self.stop.is_cancelled() {
                log::info!(target: LOG_TARGET, "Stop requested for {} before {date}", self.settings.view_id);
                break;
            }

            self.state = SchedulerState::Running(date);

            match self.pull_date(&fetcher, date).await {
                Ok(count) => log::debug!(target: LOG_TARGET, "Emitted {count} records for {} on {date}", self.settings.view_id),
                Err(e) if e.aborts_pass() => return Err(e),
                Err(e) => {
                    self.summary.skipped_dates += 1;
                    log::error!(target: LOG_TARGET, "Skipping {date} for {}: {e}", self.settings.view_id);
                }
            }
        }

        Ok(())
    }

    async fn pull_date(&mut self, fetcher: &Fetcher<P::Client>, date: NaiveDate) -> Result<u64, ReportError> {
        let mut query = self.settings.query_for(date);
        let mut emitted = 0;

        loop {
            let (response, continuation) = fetcher.fetch_page(&query).await?;

            for record in expand(&response, &query, date, &self.settings.transform)? {
                self.emitter.emit(record).await?;
                emitted += 1;
                self.summary.records_emitted += 1;
            }

            let Some(token) = continuation else {
                break;
            };

            if self.stop.is_cancelled() {
                log::info!(target: LOG_TARGET, "Stop requested for {} before the next page of {date}", self.settings.view_id);
                break;
            }

            query = query.at_page(token);
        }

        Ok(emitted)
    }
}
