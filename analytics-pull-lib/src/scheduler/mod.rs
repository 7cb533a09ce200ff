//! Per-report scheduling
//!
//! A [`Scheduler`] owns one report's settings. Each pass it acquires a fresh API client,
//! walks the configured date range one day at a time, follows pagination, and hands
//! every fanned-out record to its [`Emitter`](crate::emit::Emitter). Passes repeat on a
//! fixed interval until the shared [`CancellationToken`](tokio_util::sync::CancellationToken)
//! fires.

mod clock;
mod dates;
mod runner;
mod settings;

pub use clock::{Clock, TokioClock};
pub use dates::DateSpec;
pub use runner::{RunSummary, Scheduler, SchedulerState};
pub use settings::{AuthPolicy, ReportSettings};
