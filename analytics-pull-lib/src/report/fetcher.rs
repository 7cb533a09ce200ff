use super::{PageToken, ReportApiClient, ReportError, ReportQuery, ReportResponse};

pub(super) const LOG_TARGET: &str = "   fetcher";

/// Issues single-page report queries and exposes pagination continuation.
///
/// Never retries. Retry policy belongs to the caller.
#[derive(Debug)]
pub struct Fetcher<C> {
    client: C,
}

impl<C: ReportApiClient> Fetcher<C> {
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// Fetch the page selected by `query.start_index`.
    ///
    /// Returns the continuation cursor when the API reports more pages. A page without
    /// rows never yields a continuation, so a misbehaving API cannot loop us forever.
    pub async fn fetch_page(&self, query: &ReportQuery) -> Result<(ReportResponse, Option<PageToken>), ReportError> {
        log::debug!(
            target: LOG_TARGET,
            "Fetching {} for {}..{} (start index {}, page size {})",
            query.view_id,
            query.start_date,
            query.end_date,
            query.start_index,
            query.page_size
        );

        let response = self.client.query(&query.to_request()).await?;

        let continuation = if response.has_more_pages() && !response.rows().is_empty() {
            let next = query.next_page();
            if next.is_none() {
                log::warn!(
                    target: LOG_TARGET,
                    "Not following more pages for {}: start index {} cannot advance by {}",
                    query.view_id,
                    query.start_index,
                    query.page_size
                );
            }
            next
        } else {
            None
        };

        log::debug!(
            target: LOG_TARGET,
            "Received {} rows for {} ({} total, {} per page, more pages: {})",
            response.rows().len(),
            query.view_id,
            response.total_results.map_or_else(|| "unknown".to_string(), |n| n.to_string()),
            response.items_per_page.map_or_else(|| "unknown".to_string(), |n| n.to_string()),
            continuation.is_some()
        );

        Ok((response, continuation))
    }
}
