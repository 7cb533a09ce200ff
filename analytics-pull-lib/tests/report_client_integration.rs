//! Integration tests for the HTTP report client and fetcher using wiremock

use analytics_pull_lib::report::client::DEFAULT_REQUEST_TIMEOUT;
use analytics_pull_lib::report::{Fetcher, HttpReportClient, PageToken, ReportError, ReportQuery, SamplingLevel};
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPORT_PATH: &str = "/analytics/v3/data/ga";

fn query() -> ReportQuery {
    ReportQuery {
        view_id: "ga:1234".into(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        metrics: vec!["ga:sessions".into(), "ga:users".into()],
        dimensions: vec!["ga:browser".into()],
        filters: None,
        sort: None,
        segment: None,
        sampling_level: None,
        include_empty_rows: true,
        start_index: 1,
        page_size: 2,
    }
}

fn fetcher(server: &MockServer) -> Fetcher<HttpReportClient> {
    let base_url = format!("{}{REPORT_PATH}", server.uri());
    Fetcher::new(HttpReportClient::new("secret-token", &base_url, DEFAULT_REQUEST_TIMEOUT).unwrap())
}

fn page(rows: serde_json::Value, next_link: Option<&str>) -> serde_json::Value {
    let mut body = json!({
        "columnHeaders": [
            {"name": "ga:browser", "columnType": "DIMENSION", "dataType": "STRING"},
            {"name": "ga:sessions", "columnType": "METRIC", "dataType": "INTEGER"},
            {"name": "ga:users", "columnType": "METRIC", "dataType": "INTEGER"}
        ],
        "rows": rows,
        "containsSampledData": false,
        "query": {"ids": "ga:1234", "start-date": "2024-01-01"},
        "profileInfo": {"profileId": "1234", "profileName": "Site"},
        "totalResults": 3,
        "itemsPerPage": 2
    });
    if let Some(link) = next_link {
        body["nextLink"] = json!(link);
    }
    body
}

#[tokio::test]
async fn test_pagination_follows_next_link() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .and(query_param("start-index", "1"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([["Chrome", "10", "7"], ["Firefox", "4", "3"]]),
            Some("https://www.googleapis.com/analytics/v3/data/ga?start-index=3"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .and(query_param("start-index", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([["Safari", "1", "1"]]), None)))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server);

    let (first, token) = fetcher.fetch_page(&query()).await.unwrap();
    assert_eq!(first.rows().len(), 2);
    assert_eq!(first.header_names(), vec!["ga:browser", "ga:sessions", "ga:users"]);
    assert_eq!(first.profile_info["profileName"], "Site");
    assert_eq!(token, Some(PageToken { start_index: 3 }));

    let (second, token) = fetcher.fetch_page(&query().at_page(token.unwrap())).await.unwrap();
    assert_eq!(second.rows()[0][0], "Safari");
    assert_eq!(token, None);
}

#[tokio::test]
async fn test_request_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .and(query_param("ids", "ga:1234"))
        .and(query_param("start-date", "2024-01-01"))
        .and(query_param("end-date", "2024-01-01"))
        .and(query_param("metrics", "ga:sessions,ga:users"))
        .and(query_param("dimensions", "ga:browser"))
        .and(query_param("samplingLevel", "FASTER"))
        .and(query_param("max-results", "2"))
        .and(query_param("output", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(json!([]), None)))
        .expect(1)
        .mount(&server)
        .await;

    let mut q = query();
    q.sampling_level = Some(SamplingLevel::Faster);

    let (response, token) = fetcher(&server).fetch_page(&q).await.unwrap();
    assert!(response.rows().is_empty());
    assert_eq!(token, None);

    let requests = server.received_requests().await.unwrap();
    let url = &requests[0].url;
    assert!(url.query_pairs().all(|(name, _)| name != "filters" && name != "sort" && name != "segment"));
}

#[tokio::test]
async fn test_missing_rows_is_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columnHeaders": [{"name": "ga:sessions"}],
            "totalResults": 0
        })))
        .mount(&server)
        .await;

    let (response, token) = fetcher(&server).fetch_page(&query()).await.unwrap();
    assert!(response.rows().is_empty());
    assert_eq!(token, None);
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
        .mount(&server)
        .await;

    let result = fetcher(&server).fetch_page(&query()).await;
    assert!(matches!(result, Err(ReportError::Auth(_))), "got {result:?}");
}

#[tokio::test]
async fn test_server_error_is_transient_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher(&server).fetch_page(&query()).await;
    assert!(matches!(result, Err(ReportError::Transient(_))), "got {result:?}");
}

#[tokio::test]
async fn test_rate_limited_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let result = fetcher(&server).fetch_page(&query()).await;
    assert!(matches!(result, Err(ReportError::Transient(_))), "got {result:?}");
}

#[tokio::test]
async fn test_bad_request_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("Unknown metric: ga:bogus"))
        .mount(&server)
        .await;

    match fetcher(&server).fetch_page(&query()).await {
        Err(ReportError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("ga:bogus"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_garbage_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = fetcher(&server).fetch_page(&query()).await;
    assert!(matches!(result, Err(ReportError::Decode(_))), "got {result:?}");
}
