//! Report API client
//!
//! Minimal client for the Core Reporting API `data/ga` endpoint.

use super::{ReportError, ReportRequest, ReportResponse};
use core::time::Duration;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

/// Default endpoint for report queries
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/analytics/v3/data/ga";

/// Default timeout for a single report request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error reasons the API reports with a 403 status that are really rate limits
const RATE_LIMIT_REASONS: &[&str] = &["userRateLimitExceeded", "rateLimitExceeded", "quotaExceeded"];

/// Something that can execute a report query.
pub trait ReportApiClient: Send + Sync {
    fn query(&self, request: &ReportRequest) -> impl Future<Output = Result<ReportResponse, ReportError>> + Send;
}

/// HTTP implementation of [`ReportApiClient`]
#[derive(Debug, Clone)]
pub struct HttpReportClient {
    client: reqwest::Client,
    base_url: url::Url,
}

impl HttpReportClient {
    /// Create a client that sends `access_token` as a bearer token
    pub fn new(access_token: &str, base_url: &str, timeout: Duration) -> Result<Self, ReportError> {
        let mut auth_val = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .map_err(|e| ReportError::Auth(format!("access token is not a valid header value: {e}")))?;
        auth_val.set_sensitive(true);

        let mut headers = HeaderMap::new();
        let _ = headers.insert(AUTHORIZATION, auth_val);

        let client = reqwest::Client::builder()
            .user_agent("analytics-pull")
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ReportError::InvalidConfig(format!("unable to create HTTP client: {e}")))?;

        let base_url = url::Url::parse(base_url).map_err(|e| ReportError::InvalidConfig(format!("invalid API base URL '{base_url}': {e}")))?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn request_url(&self, request: &ReportRequest) -> url::Url {
        let mut url = self.base_url.clone();
        let _ = url
            .query_pairs_mut()
            .extend_pairs(request.params().iter().map(|(name, value)| (*name, value.as_str())));
        url
    }
}

impl ReportApiClient for HttpReportClient {
    async fn query(&self, request: &ReportRequest) -> Result<ReportResponse, ReportError> {
        let url = self.request_url(request);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ReportError::Transient(format!("{e:#}")))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| ReportError::Transient(format!("reading response body: {e:#}")))?;

        if !status.is_success() {
            return Err(classify_failure(status, body));
        }

        serde_json::from_str(&body).map_err(|e| ReportError::Decode(e.to_string()))
    }
}

/// Map a non-success HTTP status to the error taxonomy.
fn classify_failure(status: StatusCode, body: String) -> ReportError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::REQUEST_TIMEOUT {
        return ReportError::Transient(format!("HTTP {status}: {body}"));
    }

    if status == StatusCode::FORBIDDEN && RATE_LIMIT_REASONS.iter().any(|reason| body.contains(reason)) {
        return ReportError::Transient(format!("HTTP {status}: {body}"));
    }

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return ReportError::Auth(format!("HTTP {status}: {body}"));
    }

    ReportError::Api {
        status: status.as_u16(),
        message: body,
    }
}
