use super::{HttpReportClient, ReportApiClient, ReportError};
use core::time::Duration;

/// Hands out ready-to-use API clients.
///
/// Called once at the start of every pass so that each pass works with fresh credentials.
pub trait CredentialProvider: Send + Sync {
    type Client: ReportApiClient;

    fn client(&self) -> impl Future<Output = Result<Self::Client, ReportError>> + Send;
}

/// Credential provider backed by a pre-issued OAuth access token.
pub struct StaticTokenProvider {
    access_token: String,
    base_url: String,
    timeout: Duration,
}

impl core::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("access_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StaticTokenProvider {
    #[must_use]
    pub fn new(access_token: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl CredentialProvider for StaticTokenProvider {
    type Client = HttpReportClient;

    async fn client(&self) -> Result<HttpReportClient, ReportError> {
        if self.access_token.trim().is_empty() {
            return Err(ReportError::Auth("no access token configured".into()));
        }

        HttpReportClient::new(self.access_token.trim(), &self.base_url, self.timeout)
    }
}
