use super::ReportError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Maximum number of metrics the reporting API accepts in one query.
pub const MAX_METRICS: usize = 10;

/// Maximum number of dimensions the reporting API accepts in one query.
pub const MAX_DIMENSIONS: usize = 7;

/// Largest page the reporting API will return.
pub const MAX_PAGE_SIZE: u32 = 10_000;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trade-off between response speed and sampling precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SamplingLevel {
    Default,
    Faster,
    HigherPrecision,
}

/// Cursor pointing at the next page of a paginated result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageToken {
    pub start_index: u32,
}

/// One report request: a view, a date range, and the columns to retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub view_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub filters: Option<String>,
    pub sort: Option<String>,
    pub segment: Option<String>,
    pub sampling_level: Option<SamplingLevel>,
    pub include_empty_rows: bool,

    /// 1-based index of the first row to return.
    pub start_index: u32,
    pub page_size: u32,
}

impl ReportQuery {
    /// Check the structural invariants of the query.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.view_id.trim().is_empty() {
            return Err(ReportError::invalid_config("view_id must not be empty"));
        }

        if self.metrics.is_empty() {
            return Err(ReportError::invalid_config("at least one metric is required"));
        }

        if self.metrics.len() > MAX_METRICS {
            return Err(ReportError::invalid_config(format!(
                "at most {MAX_METRICS} metrics are allowed, got {}",
                self.metrics.len()
            )));
        }

        if self.dimensions.len() > MAX_DIMENSIONS {
            return Err(ReportError::invalid_config(format!(
                "at most {MAX_DIMENSIONS} dimensions are allowed, got {}",
                self.dimensions.len()
            )));
        }

        if self.start_date > self.end_date {
            return Err(ReportError::invalid_config(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }

        if self.start_index == 0 {
            return Err(ReportError::invalid_config("start_index is 1-based and must be at least 1"));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ReportError::invalid_config(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }

        Ok(())
    }

    /// The continuation cursor for the page after this one.
    ///
    /// `None` when the next start index would not fit the index type.
    #[must_use]
    pub const fn next_page(&self) -> Option<PageToken> {
        match self.start_index.checked_add(self.page_size) {
            Some(start_index) => Some(PageToken { start_index }),
            None => None,
        }
    }

    /// A copy of this query positioned at `token`.
    #[must_use]
    pub fn at_page(&self, token: PageToken) -> Self {
        Self {
            start_index: token.start_index,
            ..self.clone()
        }
    }

    /// Build the wire-level request parameters.
    ///
    /// Optional settings are omitted entirely when not configured.
    #[must_use]
    pub fn to_request(&self) -> ReportRequest {
        let mut params = vec![
            ("ids", self.view_id.clone()),
            ("start-date", self.start_date.format(DATE_FORMAT).to_string()),
            ("end-date", self.end_date.format(DATE_FORMAT).to_string()),
            ("metrics", self.metrics.join(",")),
        ];

        if !self.dimensions.is_empty() {
            params.push(("dimensions", self.dimensions.join(",")));
        }

        let optional = [
            ("filters", self.filters.as_ref()),
            ("sort", self.sort.as_ref()),
            ("segment", self.segment.as_ref()),
        ];
        params.extend(optional.into_iter().filter_map(|(name, value)| value.map(|v| (name, v.clone()))));

        if let Some(level) = self.sampling_level {
            params.push(("samplingLevel", level.to_string()));
        }

        params.push(("include-empty-rows", self.include_empty_rows.to_string()));
        params.push(("start-index", self.start_index.to_string()));
        params.push(("max-results", self.page_size.to_string()));
        params.push(("output", "json".to_string()));

        ReportRequest { params }
    }
}

/// Query-string parameters for a single API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    params: Vec<(&'static str, String)>,
}

impl ReportRequest {
    #[must_use]
    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Look up a parameter by its wire name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(n, _)| *n == name).map(|(_, v)| v.as_str())
    }

    /// The parameters as a JSON object, used when the API does not echo the query back.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.params
            .iter()
            .map(|(name, value)| ((*name).to_string(), serde_json::Value::String(value.clone())))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn query() -> ReportQuery {
        ReportQuery {
            view_id: "ga:1234".into(),
            start_date: date("2024-01-01"),
            end_date: date("2024-01-01"),
            metrics: vec!["ga:sessions".into(), "ga:users".into()],
            dimensions: vec![],
            filters: None,
            sort: None,
            segment: None,
            sampling_level: None,
            include_empty_rows: true,
            start_index: 1,
            page_size: 1000,
        }
    }

    #[test]
    fn test_request_omits_unset_optionals() {
        let request = query().to_request();
        assert_eq!(request.get("ids"), Some("ga:1234"));
        assert_eq!(request.get("metrics"), Some("ga:sessions,ga:users"));
        assert_eq!(request.get("start-date"), Some("2024-01-01"));
        assert_eq!(request.get("include-empty-rows"), Some("true"));
        assert_eq!(request.get("output"), Some("json"));
        assert!(request.get("dimensions").is_none());
        assert!(request.get("filters").is_none());
        assert!(request.get("sort").is_none());
        assert!(request.get("segment").is_none());
        assert!(request.get("samplingLevel").is_none());
    }

    #[test]
    fn test_request_includes_configured_optionals() {
        let q = ReportQuery {
            dimensions: vec!["ga:browser".into(), "ga:city".into()],
            filters: Some("ga:country==France".into()),
            sort: Some("-ga:sessions".into()),
            segment: Some("gaid::-1".into()),
            sampling_level: Some(SamplingLevel::HigherPrecision),
            include_empty_rows: false,
            ..query()
        };
        let request = q.to_request();
        assert_eq!(request.get("dimensions"), Some("ga:browser,ga:city"));
        assert_eq!(request.get("filters"), Some("ga:country==France"));
        assert_eq!(request.get("sort"), Some("-ga:sessions"));
        assert_eq!(request.get("segment"), Some("gaid::-1"));
        assert_eq!(request.get("samplingLevel"), Some("HIGHER_PRECISION"));
        assert_eq!(request.get("include-empty-rows"), Some("false"));
    }

    #[test]
    fn test_next_page_advances_by_page_size() {
        let q = query();
        let token = q.next_page().unwrap();
        assert_eq!(token.start_index, 1001);

        let next = q.at_page(token);
        assert_eq!(next.start_index, 1001);
        assert_eq!(next.to_request().get("start-index"), Some("1001"));
        assert_eq!(next.next_page().unwrap().start_index, 2001);
    }

    #[test]
    fn test_next_page_stops_at_index_limit() {
        let mut q = query();
        q.start_index = u32::MAX - 10;
        assert_eq!(q.next_page(), None);

        q.start_index = u32::MAX - q.page_size;
        assert_eq!(q.next_page(), Some(PageToken { start_index: u32::MAX }));
    }

    #[test]
    fn test_validate_accepts_valid_query() {
        query().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_metrics() {
        let q = ReportQuery { metrics: vec![], ..query() };
        assert!(matches!(q.validate(), Err(ReportError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_too_many_metrics() {
        let q = ReportQuery {
            metrics: (0..11).map(|i| format!("ga:metric{i}")).collect(),
            ..query()
        };
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_too_many_dimensions() {
        let q = ReportQuery {
            dimensions: (0..8).map(|i| format!("ga:dimension{i}")).collect(),
            ..query()
        };
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let q = ReportQuery {
            start_date: date("2024-02-01"),
            end_date: date("2024-01-01"),
            ..query()
        };
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_paging() {
        assert!(ReportQuery { start_index: 0, ..query() }.validate().is_err());
        assert!(ReportQuery { page_size: 0, ..query() }.validate().is_err());
        assert!(ReportQuery { page_size: MAX_PAGE_SIZE + 1, ..query() }.validate().is_err());
    }

    #[test]
    fn test_request_to_json() {
        let json = query().to_request().to_json();
        assert_eq!(json["ids"], "ga:1234");
        assert_eq!(json["max-results"], "1000");
    }
}
