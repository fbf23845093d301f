//! Integration tests for `PriceScraper` check and search flows.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch_scraper::adapters::text_rules;
use pricewatch_scraper::{
    BackoffPolicy, CheckError, ExtractionError, Fetcher, FetcherConfig, FieldRule, Locale,
    NetworkErrorKind, PriceScraper, ProfileAdapter, RecordingDelay, Registry, SearchProfile,
    SiteProfile,
};

const PRODUCT_PAGE: &str = r#"<html><body>
    <h1>Test Phone 128GB</h1>
    <span class="price">9 990,- Kč</span>
    <span class="old-price">11 990,- Kč</span>
</body></html>"#;

const SEARCH_PAGE: &str = r#"<html><body>
    <div class="item">
      <a class="name" href="/p/phone-1">Phone One</a>
      <img src="/img/1.jpg">
      <span class="price">4 990 Kč</span>
    </div>
    <div class="item">
      <a class="name" href="/p/phone-2">Phone Two</a>
      <span class="price">5 990 Kč</span>
      <span class="badge">Sleva</span>
    </div>
</body></html>"#;

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

fn scraper(server: &MockServer, synthetic_fallback: bool) -> PriceScraper {
    let mut registry = Registry::with_default_sites().expect("default sites compile");
    let adapter = ProfileAdapter::new(test_profile(&format!("{}/", server.uri())))
        .expect("test profile compiles");
    registry
        .register(Arc::new(adapter))
        .expect("mockshop registers");

    let config = FetcherConfig {
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
        user_agent: "pricewatch-test/0.1".to_string(),
        max_attempts: 2,
        backoff: BackoffPolicy::new(Duration::from_millis(10)),
        initial_jitter: Duration::ZERO,
        synthetic_fallback,
    };
    let fetcher = Fetcher::with_delay(config, Arc::new(RecordingDelay::new()))
        .expect("failed to build test Fetcher");
    PriceScraper::new(registry, fetcher, None).expect("contexts build")
}

#[tokio::test]
async fn check_url_extracts_price_and_sale() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/phone"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let url = format!("{}/p/phone", server.uri());
    let checked = scraper(&server, false).check_url(&url).await.unwrap();

    assert_eq!(checked.site, "mockshop");
    assert_eq!(checked.url, url);
    assert_eq!(checked.item.name, "Test Phone 128GB");
    assert!((checked.item.price - 9990.0).abs() < f64::EPSILON);
    assert!(checked.item.is_on_sale);
    assert_eq!(checked.item.original_price, Some(11990.0));
    assert!(!checked.synthetic);
}

#[tokio::test]
async fn check_item_uses_stored_site_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/phone"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRODUCT_PAGE))
        .mount(&server)
        .await;

    let url = format!("{}/p/phone", server.uri());
    let checked = scraper(&server, false)
        .check_item("mockshop", &url)
        .await
        .unwrap();
    assert!((checked.item.price - 9990.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn page_without_price_is_an_extraction_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/p/sold-out"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<h1>Sold out</h1><p>Vyprodáno</p>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/p/sold-out", server.uri());
    let err = scraper(&server, false).check_url(&url).await.unwrap_err();
    assert!(
        matches!(err, CheckError::Extraction(ExtractionError::MissingPrice)),
        "expected MissingPrice, got: {err:?}"
    );
    assert!(err.user_message().contains("layout may have changed"));
}

#[tokio::test]
async fn unsupported_host_is_rejected_without_fetching() {
    let server = MockServer::start().await;
    let err = scraper(&server, false)
        .check_url("https://www.example.com/product/1")
        .await
        .unwrap_err();
    assert!(
        matches!(err, CheckError::Extraction(ExtractionError::UnsupportedSite(ref h)) if h == "www.example.com"),
        "expected UnsupportedSite, got: {err:?}"
    );
}

#[tokio::test]
async fn check_with_synthetic_fallback_returns_placeholder_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/p/tv-55", server.uri());
    let checked = scraper(&server, true).check_url(&url).await.unwrap();
    assert!(checked.synthetic);
    assert_eq!(checked.item.name, "Mock Product - tv-55");
    assert!((checked.item.price - 12999.0).abs() < f64::EPSILON);
    assert!(!checked.item.is_on_sale);
}

#[tokio::test]
async fn forbidden_check_surfaces_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;

    let url = format!("{}/p/phone", server.uri());
    let err = scraper(&server, false).check_url(&url).await.unwrap_err();
    match &err {
        CheckError::Network(e) => assert_eq!(e.kind, NetworkErrorKind::Forbidden),
        other => panic!("expected Network error, got: {other:?}"),
    }
    assert!(err.user_message().contains("403"));
}

#[tokio::test]
async fn search_parses_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "phone"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let results = scraper(&server, false)
        .search("mockshop", "phone", 10)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "Phone One");
    assert_eq!(results[0].url, format!("{}/p/phone-1", server.uri()));
    assert_eq!(
        results[0].image_url.as_deref(),
        Some(format!("{}/img/1.jpg", server.uri()).as_str())
    );
    assert!(!results[0].is_on_sale);
    assert!(results[1].is_on_sale);
    assert_eq!(results[1].original_price, None);
}

#[tokio::test]
async fn search_respects_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
        .mount(&server)
        .await;

    let results = scraper(&server, false)
        .search("mockshop", "phone", 1)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn search_unknown_site_is_unsupported() {
    let server = MockServer::start().await;
    let err = scraper(&server, false)
        .search("mall", "phone", 5)
        .await
        .unwrap_err();
    assert!(
        matches!(err, CheckError::Extraction(ExtractionError::UnsupportedSite(ref s)) if s == "mall"),
        "expected UnsupportedSite, got: {err:?}"
    );
}

#[tokio::test]
async fn search_failure_with_fallback_returns_synthetic_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let results = scraper(&server, true)
        .search("mockshop", "usb cable", 3)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].name, "Usb Cable - Product 1");
    assert!(results[0].is_on_sale);
    assert!(!results[1].is_on_sale);
}

#[tokio::test]
async fn search_failure_without_fallback_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = scraper(&server, false)
        .search("mockshop", "phone", 3)
        .await
        .unwrap_err();
    assert!(matches!(err, CheckError::Network(_)), "{err:?}");
}
