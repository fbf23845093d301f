//! Integration tests for `Fetcher` against a local `wiremock` server.
//!
//! A test-only shop profile claims `127.0.0.1` so the real header-building
//! path is exercised without any external traffic.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch_scraper::adapters::text_rules;
use pricewatch_scraper::{
    BackoffPolicy, FetcherConfig, Fetcher, FieldRule, Locale, NetworkErrorKind, ProfileAdapter,
    RecordingDelay, SearchProfile, SiteContext, SiteProfile,
};

fn test_profile(home_url: &str) -> SiteProfile {
    SiteProfile {
        site_id: "mockshop".to_string(),
        home_url: home_url.to_string(),
        locale: Locale::Czech,
        host_suffix: "127.0.0.1".to_string(),
        name: vec![FieldRule::text("h1")],
        price: text_rules(&[".price"]),
        struck_price: text_rules(&[".old-price"]),
        sale_badge: text_rules(&[".badge"]),
        search: SearchProfile {
            path: "/search".to_string(),
            query_param: "q".to_string(),
            result_box: vec![".item"],
            name_link: vec!["a.name"],
            price: text_rules(&[".price"]),
            struck_price: text_rules(&[".old-price"]),
            sale_badge: text_rules(&[".badge"]),
            image: vec!["img"],
        },
    }
}

fn context(server: &MockServer) -> SiteContext {
    let adapter = ProfileAdapter::new(test_profile(&format!("{}/", server.uri())))
        .expect("test profile compiles");
    SiteContext::for_adapter(&adapter, None).expect("default headers are valid")
}

fn config(max_attempts: u32, synthetic_fallback: bool) -> FetcherConfig {
    FetcherConfig {
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
        user_agent: "pricewatch-test/0.1".to_string(),
        max_attempts,
        backoff: BackoffPolicy::new(Duration::from_secs(2)),
        initial_jitter: Duration::ZERO,
        synthetic_fallback,
    }
}

fn fetcher(config: FetcherConfig) -> (Fetcher, Arc<RecordingDelay>) {
    let delay = Arc::new(RecordingDelay::new());
    let fetcher = Fetcher::with_delay(config, delay.clone()).expect("failed to build test Fetcher");
    (fetcher, delay)
}

#[tokio::test]
async fn fails_twice_then_succeeds_within_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/phone"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p/phone"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Phone</h1>"))
        .mount(&server)
        .await;

    let (fetcher, delay) = fetcher(config(3, false));
    let url = format!("{}/p/phone", server.uri());
    let page = fetcher.fetch(&url, &context(&server)).await.unwrap();

    assert_eq!(page.body, "<h1>Phone</h1>");
    assert!(!page.synthetic);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3, "expected 2 failures + 1 success");

    let waits = delay.recorded();
    assert_eq!(waits.len(), 2, "one backoff wait per retry");
    assert!(waits[0] >= Duration::from_secs(1) && waits[0] < Duration::from_secs(3));
    assert!(waits[1] >= Duration::from_secs(2) && waits[1] < Duration::from_secs(6));
}

#[tokio::test]
async fn forbidden_is_classified_after_all_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .expect(3)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(config(3, false));
    let url = format!("{}/p/blocked", server.uri());
    let err = fetcher.fetch(&url, &context(&server)).await.unwrap_err();

    assert_eq!(err.kind, NetworkErrorKind::Forbidden);
    assert_eq!(err.status, Some(403));
    assert_eq!(err.url, url);
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, delay) = fetcher(config(3, false));
    let url = format!("{}/p/gone", server.uri());
    let err = fetcher.fetch(&url, &context(&server)).await.unwrap_err();

    assert_eq!(err.kind, NetworkErrorKind::Other);
    assert_eq!(err.status, Some(404));
    assert!(delay.recorded().is_empty());
}

#[tokio::test]
async fn slow_response_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;

    let mut cfg = config(1, false);
    cfg.request_timeout = Duration::from_millis(100);
    let (fetcher, _) = fetcher(cfg);
    let url = format!("{}/p/slow", server.uri());
    let err = fetcher.fetch(&url, &context(&server)).await.unwrap_err();

    assert_eq!(err.kind, NetworkErrorKind::Timeout, "{err}");
}

#[tokio::test]
async fn sends_locale_headers_and_home_referer() {
    let server = MockServer::start().await;
    let home = format!("{}/", server.uri());
    Mock::given(method("GET"))
        .and(path("/p/phone"))
        .and(headers("accept-language", vec!["cs-CZ", "cs;q=0.9", "en;q=0.8"]))
        .and(header("referer", home.as_str()))
        .and(header("sec-fetch-mode", "navigate"))
        .and(header("user-agent", "pricewatch-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(config(1, false));
    let url = format!("{}/p/phone", server.uri());
    let page = fetcher.fetch(&url, &context(&server)).await.unwrap();
    assert_eq!(page.body, "ok");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0].headers;
    assert_eq!(
        sent.get("accept-language").and_then(|v| v.to_str().ok()),
        Some("cs-CZ,cs;q=0.9,en;q=0.8")
    );
    assert!(sent
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html")));
}

#[tokio::test]
async fn cookies_persist_between_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "session=abc; Path=/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .and(header("cookie", "session=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("with cookie"))
        .expect(1)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(config(1, false));
    let ctx = context(&server);
    fetcher
        .fetch(&format!("{}/first", server.uri()), &ctx)
        .await
        .unwrap();
    let page = fetcher
        .fetch(&format!("{}/second", server.uri()), &ctx)
        .await
        .unwrap();
    assert_eq!(page.body, "with cookie");
}

#[tokio::test]
async fn synthetic_fallback_serves_placeholder_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(config(3, true));
    let url = format!("{}/p/galaxy-s24", server.uri());
    let page = fetcher.fetch(&url, &context(&server)).await.unwrap();

    assert!(page.synthetic);
    assert!(page.body.contains("Mock Product - galaxy-s24"), "{}", page.body);
}

#[tokio::test]
async fn try_fetch_never_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (fetcher, _) = fetcher(config(2, true));
    let url = format!("{}/search?q=x", server.uri());
    let err = fetcher.try_fetch(&url, &context(&server)).await.unwrap_err();
    assert_eq!(err.status, Some(500));
}

#[tokio::test]
async fn initial_pause_is_bounded_by_configured_jitter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut cfg = config(1, false);
    cfg.initial_jitter = Duration::from_millis(500);
    let (fetcher, delay) = fetcher(cfg);
    fetcher
        .fetch(&format!("{}/p/x", server.uri()), &context(&server))
        .await
        .unwrap();

    let waits = delay.recorded();
    assert_eq!(waits.len(), 1);
    assert!(waits[0] <= Duration::from_millis(500), "{:?}", waits[0]);
}
