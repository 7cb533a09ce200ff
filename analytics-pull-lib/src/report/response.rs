//! Report API response model
//!
//! Mirrors the `gaData` resource of the Core Reporting API, keeping only the fields
//! the transformation pipeline consumes.

use serde::Deserialize;

/// One column of a report, either a metric or a dimension.
///
/// Only the name matters: a column is a metric when its name is one of the queried metrics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnHeader {
    pub name: String,
}

impl ColumnHeader {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    #[serde(default)]
    pub column_headers: Vec<ColumnHeader>,

    /// Absent when the report has no data for the requested range.
    #[serde(default)]
    pub rows: Option<Vec<Vec<String>>>,

    #[serde(default)]
    pub contains_sampled_data: bool,

    /// The query as interpreted by the API.
    #[serde(default)]
    pub query: serde_json::Value,

    /// Metadata about the view the report was generated for.
    #[serde(default)]
    pub profile_info: serde_json::Value,

    /// Present only when more pages of results exist.
    #[serde(default)]
    pub next_link: Option<String>,

    #[serde(default)]
    pub total_results: Option<u64>,

    #[serde(default)]
    pub items_per_page: Option<u32>,
}

impl ReportResponse {
    /// Build a response from header names and raw rows.
    #[must_use]
    pub fn new<I, S>(headers: I, rows: Vec<Vec<String>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column_headers: headers.into_iter().map(ColumnHeader::named).collect(),
            rows: Some(rows),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header_names(&self) -> Vec<&str> {
        self.column_headers.iter().map(|h| h.name.as_str()).collect()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        self.rows.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub const fn has_more_pages(&self) -> bool {
        self.next_link.is_some()
    }
}
