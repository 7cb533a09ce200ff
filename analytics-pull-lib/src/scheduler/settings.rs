use super::DateSpec;
use crate::emit::DEFAULT_EVENT_TYPE;
use crate::report::{MAX_PAGE_SIZE, ReportError, ReportQuery, SamplingLevel};
use crate::transform::TransformOptions;
use chrono::NaiveDate;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use strum::Display;

/// What a repeating scheduler does when a pass fails for lack of valid credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuthPolicy {
    /// Keep the schedule going and acquire a fresh client on the next pass.
    #[default]
    Retry,

    /// Stop the scheduler.
    Halt,
}

/// Everything one scheduler needs to know about its report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub view_id: String,
    pub start_date: DateSpec,
    pub end_date: DateSpec,
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub filters: Option<String>,
    pub sort: Option<String>,
    pub segment: Option<String>,
    pub sampling_level: Option<SamplingLevel>,
    pub include_empty_rows: bool,
    pub start_index: u32,
    pub page_size: u32,

    /// Time between the starts of consecutive passes; `None` runs a single pass.
    pub interval: Option<Duration>,

    pub transform: TransformOptions,
    pub event_type: String,
    pub auth_policy: AuthPolicy,
}

impl ReportSettings {
    /// Settings with defaults for everything but the view, the dates, and the metrics.
    #[must_use]
    pub fn new(view_id: impl Into<String>, start_date: DateSpec, end_date: DateSpec, metrics: Vec<String>) -> Self {
        Self {
            view_id: view_id.into(),
            start_date,
            end_date,
            metrics,
            dimensions: Vec::new(),
            filters: None,
            sort: None,
            segment: None,
            sampling_level: None,
            include_empty_rows: true,
            start_index: 1,
            page_size: MAX_PAGE_SIZE,
            interval: None,
            transform: TransformOptions::default(),
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            auth_policy: AuthPolicy::default(),
        }
    }

    /// Resolve the configured date range against `today`.
    pub fn date_range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), ReportError> {
        let start = self.start_date.resolve(today);
        let end = self.end_date.resolve(today);

        if start > end {
            return Err(ReportError::invalid_config(format!(
                "start date {} ({start}) is after end date {} ({end})",
                self.start_date, self.end_date
            )));
        }

        Ok((start, end))
    }

    /// The first-page query for a single date.
    #[must_use]
    pub fn query_for(&self, date: NaiveDate) -> ReportQuery {
        self.query(date, date)
    }

    fn query(&self, start_date: NaiveDate, end_date: NaiveDate) -> ReportQuery {
        ReportQuery {
            view_id: self.view_id.clone(),
            start_date,
            end_date,
            metrics: self.metrics.clone(),
            dimensions: self.dimensions.clone(),
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            segment: self.segment.clone(),
            sampling_level: self.sampling_level,
            include_empty_rows: self.include_empty_rows,
            start_index: self.start_index,
            page_size: self.page_size,
        }
    }

    /// Check the settings as they would stand on `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<(), ReportError> {
        let (start, end) = self.date_range(today)?;
        self.query(start, end).validate()?;

        if self.interval.is_some_and(|interval| interval.is_zero()) {
            return Err(ReportError::invalid_config("interval must be greater than zero"));
        }

        if self.event_type.trim().is_empty() {
            return Err(ReportError::invalid_config("event_type must not be empty"));
        }

        Ok(())
    }
}
