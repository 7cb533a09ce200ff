use super::{CellValue, Entry, classify};
use crate::report::{ReportError, ReportQuery, ReportResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::Display;

pub(super) const LOG_TARGET: &str = "    fanout";

/// Namespace prefix stripped from column names before they become record keys.
pub const NAMESPACE_PREFIX: &str = "ga:";

/// Shape of the records produced for each report row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmissionMode {
    /// One record per configured metric, each carrying the row's full dimension set.
    #[default]
    PerMetric,

    /// One record per row carrying every metric of that row.
    PerRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    pub mode: EmissionMode,

    /// Attach the serialized query to every record.
    pub store_query: bool,

    /// Attach the view's profile metadata to every record.
    pub store_profile: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            mode: EmissionMode::PerMetric,
            store_query: true,
            store_profile: true,
        }
    }
}

/// The metric payload of an [`OutputRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordMetrics {
    /// A single metric; `value` is `None` when the row did not contain the metric.
    Single { name: String, value: Option<CellValue> },

    /// All metrics of a row, in column order.
    All(Vec<Entry>),
}

/// A flattened, emission-ready record.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub date: NaiveDate,
    pub contains_sampled_data: bool,
    pub metrics: RecordMetrics,

    /// Dimensions of the originating row, keyed by their full column names.
    pub dimensions: Vec<Entry>,
    pub query: Option<String>,
    pub profile_info: Option<serde_json::Value>,
}

impl OutputRecord {
    /// Dimensions keyed by their namespace-free names.
    pub fn dimension_fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.dimensions.iter().map(|d| (strip_namespace(&d.name), &d.value))
    }
}

/// Remove the leading [`NAMESPACE_PREFIX`] from a column name, if present.
#[must_use]
pub fn strip_namespace(name: &str) -> &str {
    name.strip_prefix(NAMESPACE_PREFIX).unwrap_or(name)
}

/// Convert one report page into output records.
///
/// An empty page yields no records. Records are produced row by row and, within a row,
/// in the order metrics appear in `query.metrics`, so identical input always yields an
/// identical sequence.
pub fn expand(
    response: &ReportResponse,
    query: &ReportQuery,
    date: NaiveDate,
    options: &TransformOptions,
) -> Result<Vec<OutputRecord>, ReportError> {
    let rows = response.rows();
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let headers = response.header_names();
    let classified = rows
        .iter()
        .map(|row| classify(&headers, row, &query.metrics))
        .collect::<Result<Vec<_>, _>>()?;

    let query_echo = options.store_query.then(|| {
        if response.query.is_null() {
            query.to_request().to_json().to_string()
        } else {
            response.query.to_string()
        }
    });
    let profile_info = options.store_profile.then(|| response.profile_info.clone());

    let capacity = match options.mode {
        EmissionMode::PerMetric => rows.len() * query.metrics.len(),
        EmissionMode::PerRow => rows.len(),
    };
    let mut records = Vec::with_capacity(capacity);

    for row in classified {
        match options.mode {
            EmissionMode::PerMetric => {
                for name in &query.metrics {
                    let value = row.metric(name).map(|e| e.value.clone());
                    if value.is_none() {
                        log::debug!(target: LOG_TARGET, "Metric {name} missing from a {date} row of {}", query.view_id);
                    }

                    records.push(OutputRecord {
                        date,
                        contains_sampled_data: response.contains_sampled_data,
                        metrics: RecordMetrics::Single { name: name.clone(), value },
                        dimensions: row.dimensions.clone(),
                        query: query_echo.clone(),
                        profile_info: profile_info.clone(),
                    });
                }
            }
            EmissionMode::PerRow => records.push(OutputRecord {
                date,
                contains_sampled_data: response.contains_sampled_data,
                metrics: RecordMetrics::All(row.metrics),
                dimensions: row.dimensions,
                query: query_echo.clone(),
                profile_info: profile_info.clone(),
            }),
        }
    }

    Ok(records)
}
