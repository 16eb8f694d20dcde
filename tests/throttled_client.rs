//! End-to-end tests of the request wrapper against a mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use throttled_fetch::{
    AdaptiveThrottler, FailureThreshold, FetchError, ReqwestTransport, RequestOptions,
    RequestSettings, ThrottledClient, ThrottlerConfig, TransportError,
};

/// Client with a pinned sampler so throttling decisions are deterministic.
fn test_client(sample: f64) -> ThrottledClient<ReqwestTransport> {
    let throttler = AdaptiveThrottler::new(ThrottlerConfig::default())
        .expect("default config is valid")
        .with_sampler(move || sample);
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build client");
    ThrottledClient::new(Arc::new(throttler), ReqwestTransport::new(Arc::new(http)))
}

fn totals(client: &ThrottledClient<ReqwestTransport>, key: &str) -> (u64, u64) {
    let t = client
        .throttler()
        .window_totals(key, Utc::now())
        .unwrap_or_default();
    (t.requests, t.accepts)
}

#[tokio::test]
async fn test_successful_requests_are_never_throttled() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(10)
        .mount(&mock_server)
        .await;

    // A sampler at 0 throttles whenever the probability is above zero
    let client = test_client(0.0);
    let url = format!("{}/health", mock_server.uri());

    for _ in 0..10 {
        let response = client
            .request(&url, &RequestOptions::default(), RequestSettings::default())
            .await
            .expect("healthy backend must not be throttled");
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(response.text().await.unwrap(), "OK");
    }
    assert_eq!(totals(&client, &url), (10, 10));
}

#[tokio::test]
async fn test_server_errors_lead_to_local_throttling() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = test_client(0.6);
    let url = format!("{}/flaky", mock_server.uri());
    let options = RequestOptions::default();
    let settings = RequestSettings::default();

    // 5xx responses are returned to the caller, only counted as failures
    for _ in 0..2 {
        let response = client.request(&url, &options, settings).await.unwrap();
        assert_eq!(response.status().as_u16(), 503);
    }

    let err = client.request(&url, &options, settings).await.unwrap_err();
    match err {
        FetchError::Throttled { key } => assert_eq!(key, url),
        other => panic!("expected throttling, got {other:?}"),
    }
    assert_eq!(totals(&client, &url), (2, 0));
    // MockServer verifies on drop that only two requests arrived
}

#[tokio::test]
async fn test_query_params_share_one_window() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = test_client(1.0);
    let base = format!("{}/items", mock_server.uri());
    for page in 1..=3 {
        client
            .request(
                &format!("{base}?page={page}"),
                &RequestOptions::default(),
                RequestSettings::default(),
            )
            .await
            .unwrap();
    }

    assert_eq!(client.throttler().tracked_destinations(), 1);
    assert_eq!(totals(&client, &base), (3, 3));
}

#[tokio::test]
async fn test_client_errors_count_as_failures_when_opted_in() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = test_client(1.0);
    let lenient_url = format!("{}/lenient", mock_server.uri());
    let strict_url = format!("{}/strict", mock_server.uri());

    client
        .request(&lenient_url, &RequestOptions::default(), RequestSettings::default())
        .await
        .unwrap();
    client
        .request(
            &strict_url,
            &RequestOptions::default(),
            RequestSettings {
                failure_threshold: FailureThreshold::ClientAndServerErrors,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(totals(&client, &lenient_url), (1, 1));
    assert_eq!(totals(&client, &strict_url), (1, 0));
}

#[tokio::test]
async fn test_request_options_are_forwarded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(wiremock::matchers::header("x-request-id", "abc"))
        .and(wiremock::matchers::body_string("payload"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(1.0);
    let options = RequestOptions {
        method: Some(reqwest::Method::POST),
        headers: [("x-request-id".to_string(), "abc".to_string())].into(),
        body: Some(b"payload".to_vec()),
        timeout: Some(Duration::from_secs(2)),
    };

    let response = client
        .request(
            &format!("{}/submit", mock_server.uri()),
            &options,
            RequestSettings::default(),
        )
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn test_connection_failure_is_recorded_and_returned() {
    // Reserve a port, then close it so connections are refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = test_client(1.0);
    let url = format!("http://127.0.0.1:{port}/down");
    let err = client
        .request(&url, &RequestOptions::default(), RequestSettings::default())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Transport(TransportError::Http(_))));
    assert_eq!(totals(&client, &url), (1, 0));
}

#[tokio::test]
async fn test_cancelled_request_is_not_recorded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let client = test_client(1.0);
    let url = format!("{}/slow", mock_server.uri());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client
        .request_with_cancel(
            &url,
            &RequestOptions::default(),
            RequestSettings::default(),
            Some(&cancel),
        )
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(totals(&client, &url), (0, 0));
}

#[tokio::test]
async fn test_unthrottled_requests_leave_no_state() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = test_client(0.0);
    let settings = RequestSettings {
        apply_throttling: false,
        ..Default::default()
    };
    for _ in 0..5 {
        client
            .request(&mock_server.uri(), &RequestOptions::default(), settings)
            .await
            .unwrap();
    }
    assert_eq!(client.throttler().tracked_destinations(), 0);
}
