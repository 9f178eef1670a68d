//! PageFetcher tests against a mock registry

use std::collections::HashMap;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use efrsb_server::ingest::{FetchError, PageFetcher, RegistryHttpConfig};

#[tokio::test]
async fn test_fetch_returns_page_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Messages.aspx"))
        .and(query_param("PageID", "3"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>listing</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(RegistryHttpConfig::for_base_url(server.uri())).expect("fetcher");
    let body = fetcher.fetch(3, &HashMap::new()).await.expect("fetch");

    assert_eq!(body, "<html>listing</html>");
}

#[tokio::test]
async fn test_fetch_forwards_filters_as_query_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Messages.aspx"))
        .and(query_param("PageID", "1"))
        .and(query_param("debtor", "Иванов"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(RegistryHttpConfig::for_base_url(server.uri())).expect("fetcher");
    let filters = HashMap::from([("debtor".to_string(), "Иванов".to_string())]);

    let body = fetcher.fetch(1, &filters).await.expect("fetch");
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_non_success_status_becomes_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Messages.aspx"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = PageFetcher::new(RegistryHttpConfig::for_base_url(server.uri())).expect("fetcher");
    let err = fetcher.fetch(5, &HashMap::new()).await.expect_err("status error");

    match err {
        FetchError::Status { page, status } => {
            assert_eq!(page, 5);
            assert_eq!(status.as_u16(), 404);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_failure_becomes_request_error() {
    // Nothing listens on this port
    let config = RegistryHttpConfig::for_base_url("http://127.0.0.1:1");
    let fetcher = PageFetcher::new(config).expect("fetcher");

    let err = fetcher.fetch(2, &HashMap::new()).await.expect_err("request error");
    assert!(matches!(err, FetchError::Request { page: 2, .. }));
    assert_eq!(err.page(), 2);
}
