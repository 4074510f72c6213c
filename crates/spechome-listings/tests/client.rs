//! Integration tests for `ListingsClient` using wiremock HTTP mocks.

use spechome_core::{
    fetch_all_pages, find_nearby, DistanceCalibration, GeoPoint, ListingSource, PagePolicy,
    RegionConfig, SearchFilters,
};
use spechome_listings::{build_search_url, encode_component, ListingsClient, ListingsError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ListingsClient {
    ListingsClient::with_base_url("test-key", base_url, RegionConfig::oak_brook())
        .expect("client construction should not fail")
}

fn listing(id: u64, city: &str, lat: f64, lng: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id.to_string(),
        "unformattedPrice": 650_000,
        "price": "$650,000",
        "livingArea": 1_400,
        "address": { "street": format!("{id} Main St"), "city": city, "state": "IL" },
        "latLong": { "latitude": lat, "longitude": lng }
    })
}

#[tokio::test]
async fn search_page_sends_encoded_search_url_and_auth_headers() {
    let server = MockServer::start().await;
    let filters = SearchFilters::teardown_candidates(Some(900_000), None);
    let expected_url = build_search_url(&RegionConfig::oak_brook(), &filters);

    Mock::given(method("GET"))
        .and(path("/api/search/byurl"))
        .and(query_param("url", expected_url.as_str()))
        .and(query_param("page", "2"))
        .and(header("x-rapidapi-key", "test-key"))
        .and(header("x-rapidapi-host", "127.0.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "totalCount": 81,
            "results": [listing(1, "Oak Brook", 41.84, -87.95)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_page(&filters, 2)
        .await
        .expect("should parse search page");

    assert_eq!(page.success, Some(true));
    assert_eq!(page.total_count, Some(81));
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].price, Some(650_000.0));
    assert_eq!(page.results[0].city(), Some("Oak Brook"));
    assert_eq!(
        page.results[0].extra.get("price"),
        Some(&serde_json::json!("$650,000"))
    );
}

#[test]
fn encoded_search_url_has_no_reserved_characters() {
    let filters = SearchFilters::sold_comps(Some("Hinsdale".to_owned()));
    let encoded = encode_component(&build_search_url(&RegionConfig::oak_brook(), &filters));
    assert!(encoded.starts_with("https%3A%2F%2Fwww.zillow.com%2Fhinsdale-il%2Fsold%2F%3F"));
    assert!(!encoded.contains(['/', '?', '&', '{', '"', ' ']));
}

#[tokio::test]
async fn failure_payload_is_an_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/search/byurl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "Could not scrape url"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let page = client
        .search_page(&SearchFilters::sold_comps(None), 1)
        .await
        .expect("failure payload is not an error");
    assert!(page.results.is_empty());
    assert_eq!(page.message.as_deref(), Some("Could not scrape url"));
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_page(&SearchFilters::sold_comps(None), 1)
        .await
        .expect_err("429 should fail");
    assert!(
        matches!(err, ListingsError::RateLimited { retry_after_secs: 17 }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn server_error_is_retried_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/property"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/property"))
        .and(query_param("zpid", "555"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "zpid": 555,
            "schools": [{ "name": "Walker", "level": "Elementary", "district": "District 181", "rating": 9 }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri()).with_retry(2, 0);
    let details = client.property("555").await.expect("retry should succeed");
    assert_eq!(details.schools.len(), 1);
    assert_eq!(details.schools[0].district.as_deref(), Some("District 181"));
    assert_eq!(details.extra.get("zpid"), Some(&serde_json::json!(555)));
}

#[tokio::test]
async fn unexpected_status_without_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "message": "You are not subscribed to this API."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.property("1").await.expect_err("403 should fail");
    assert!(
        matches!(err, ListingsError::UnexpectedStatus { status: 403, ref url } if url.ends_with("/api/property")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn property_failure_payload_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/property"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "Property not found"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .property_details("404404")
        .await
        .expect_err("failure payload");
    assert!(matches!(err, ListingsError::Api(ref m) if m == "Property not found"));
}

#[tokio::test]
async fn invalid_json_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .search_page(&SearchFilters::sold_comps(None), 1)
        .await
        .expect_err("html body");
    assert!(matches!(err, ListingsError::Deserialize { .. }));
}

#[tokio::test]
async fn fetch_all_pages_stops_on_short_page() {
    let server = MockServer::start().await;
    let full: Vec<_> = (0..2)
        .map(|i| listing(i, "Westmont", 41.79, -87.97))
        .collect();

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "results": full
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "results": [listing(10, "Westmont", 41.80, -87.97)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let policy = PagePolicy {
        page_size: 2,
        max_pages: 10,
    };
    let all = fetch_all_pages(&client, &SearchFilters::sold_comps(None), policy).await;
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn find_nearby_keeps_partial_results_on_upstream_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "results": [
                listing(1, "Westmont", 41.80, -87.97),
                listing(2, "Hinsdale", 41.80, -87.97)
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let nearby = find_nearby(
        &client,
        GeoPoint {
            lat: 41.79,
            lng: -87.97,
        },
        Some("Westmont"),
        1.0,
        PagePolicy {
            page_size: 2,
            max_pages: 5,
        },
        &DistanceCalibration::default(),
    )
    .await;

    assert_eq!(nearby.total_in_city, 1);
    assert_eq!(nearby.results.len(), 1);
    assert_eq!(nearby.results[0].listing.city(), Some("Westmont"));
}
