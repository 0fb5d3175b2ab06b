//! HTTP API integration tests
//!
//! Every route and validation rule, served over the in-memory backend.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use adserve::api::services::AppStartTime;
use adserve::runtime::modes::server::app_routes;
use adserve::services::{AdService, PageLimits};
use adserve::storage::{AdStore, MemoryBackend, StoreOptions};
use adserve::utils::{CountryCatalog, Iso3166Catalog};

// =============================================================================
// Test Setup
// =============================================================================

fn new_service(daily_limit: i64) -> Arc<AdService> {
    let store = Arc::new(AdStore::new(
        Arc::new(MemoryBackend::new()),
        StoreOptions {
            daily_limit,
            ..StoreOptions::default()
        },
    ));
    Arc::new(AdService::new(store, PageLimits::default()))
}

macro_rules! init_app {
    ($service:expr) => {{
        let countries: Arc<dyn CountryCatalog> = Arc::new(Iso3166Catalog);
        test::init_service(
            App::new()
                .app_data(web::Data::new($service.clone()))
                .app_data(web::Data::new(countries))
                .app_data(web::Data::new(AppStartTime {
                    start_datetime: Utc::now(),
                }))
                .configure(app_routes),
        )
        .await
    }};
}

fn ad_body(title: &str, end_in_hours: i64) -> Value {
    let now = Utc::now();
    json!({
        "title": title,
        "startAt": (now - Duration::hours(1)).to_rfc3339(),
        "endAt": (now + Duration::hours(end_in_hours)).to_rfc3339(),
        "conditions": {
            "ageStart": 20,
            "ageEnd": 30,
            "gender": "F",
            "country": ["TW", "JP"],
            "platform": ["ios", "web"]
        }
    })
}

// =============================================================================
// POST /api/v1/ad
// =============================================================================

#[actix_rt::test]
async fn test_create_ad_returns_created() {
    let service = new_service(10);
    let app = init_app!(service);

    let req = TestRequest::post()
        .uri("/api/v1/ad")
        .set_json(ad_body("AD 1", 5))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["ad"]["title"], "AD 1");
    assert_eq!(body["ad"]["conditions"]["ageStart"], 20);

    assert_eq!(service.quota_status().await.unwrap().used, 1);
}

#[actix_rt::test]
async fn test_create_ad_without_conditions() {
    let service = new_service(10);
    let app = init_app!(service);

    let now = Utc::now();
    let req = TestRequest::post()
        .uri("/api/v1/ad")
        .set_json(json!({
            "title": "plain",
            "startAt": now.to_rfc3339(),
            "endAt": (now + Duration::days(1)).to_rfc3339(),
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_rt::test]
async fn test_create_ad_rejects_bad_body() {
    let service = new_service(10);
    let app = init_app!(service);

    let req = TestRequest::post()
        .uri("/api/v1/ad")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"title\": 1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid request body");
    assert_eq!(body["code"], 1000);

    // rejected bodies do not consume quota
    assert_eq!(service.quota_status().await.unwrap().used, 0);
}

#[actix_rt::test]
async fn test_create_ad_rejects_invalid_conditions() {
    let service = new_service(10);
    let app = init_app!(service);

    let cases = [
        ("/conditions/ageStart", json!(0)),
        ("/conditions/ageEnd", json!(150)),
        ("/conditions/gender", json!("X")),
        ("/conditions/country", json!(["TW", "ZZ"])),
        ("/conditions/platform", json!(["windows"])),
        ("/title", json!("")),
    ];

    for (pointer, value) in cases {
        let mut body = ad_body("bad", 5);
        *body.pointer_mut(pointer).unwrap() = value;

        let req = TestRequest::post()
            .uri("/api/v1/ad")
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            StatusCode::BAD_REQUEST,
            "{pointer} should be rejected"
        );
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 3000);
    }

    assert_eq!(service.quota_status().await.unwrap().used, 0);
}

#[actix_rt::test]
async fn test_create_ad_quota_exceeded() {
    let service = new_service(2);
    let app = init_app!(service);

    for i in 0..2 {
        let req = TestRequest::post()
            .uri("/api/v1/ad")
            .set_json(ad_body(&format!("AD {i}"), 5))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = TestRequest::post()
        .uri("/api/v1/ad")
        .set_json(ad_body("AD 3", 5))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 3001);
    assert_eq!(body["error"], "Daily ad creation limit reached");

    // the refused ad was not stored
    let req = TestRequest::get()
        .uri("/api/v1/ad?limit=100")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

// =============================================================================
// GET /api/v1/ad
// =============================================================================

#[actix_rt::test]
async fn test_list_filters_sorts_and_paginates() {
    let service = new_service(100);
    let app = init_app!(service);

    for (title, hours) in [("late", 9), ("early", 2), ("middle", 5)] {
        let req = TestRequest::post()
            .uri("/api/v1/ad")
            .set_json(ad_body(title, hours))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = TestRequest::get()
        .uri("/api/v1/ad?age=25&gender=F&country=TW&platform=ios")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["early", "middle", "late"]);

    let req = TestRequest::get()
        .uri("/api/v1/ad?offset=1&limit=1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"][0]["title"], "middle");
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let req = TestRequest::get()
        .uri("/api/v1/ad?gender=M")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["items"].as_array().unwrap().is_empty());

    let req = TestRequest::get()
        .uri("/api/v1/ad?offset=1000")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_list_empty_store() {
    let service = new_service(10);
    let app = init_app!(service);

    let req = TestRequest::get().uri("/api/v1/ad").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "items": [] }));
}

#[actix_rt::test]
async fn test_list_rejects_invalid_params() {
    let service = new_service(10);
    let app = init_app!(service);

    let cases = [
        ("foo=1", "Invalid parameter name: 'foo'"),
        (
            "age=0",
            "Invalid 'age' parameter, must be an integer between 1 and 100",
        ),
        (
            "age=abc",
            "Invalid 'age' parameter, must be an integer between 1 and 100",
        ),
        ("gender=X", "Invalid 'gender' parameter, must be 'M' or 'F'"),
        (
            "country=123",
            "Invalid 'country' parameter, must be a non-numeric string",
        ),
        (
            "platform=windows",
            "Invalid 'platform' parameter, must be 'ios', 'web' or 'android'",
        ),
        (
            "limit=0",
            "Invalid 'limit' parameter, must be an integer greater than 0",
        ),
        (
            "offset=-2",
            "Invalid 'offset' parameter, must be an integer greater than or equal to 0",
        ),
    ];

    for (query, message) in cases {
        let req = TestRequest::get()
            .uri(&format!("/api/v1/ad?{query}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{query}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], message, "{query}");
        assert_eq!(body["code"], 3000);
    }
}

// =============================================================================
// POST /api/v1/admin/reset-ad-counter
// =============================================================================

#[actix_rt::test]
async fn test_reset_counter_reopens_creation() {
    let service = new_service(1);
    let app = init_app!(service);

    let create = |title: &str| {
        TestRequest::post()
            .uri("/api/v1/ad")
            .set_json(ad_body(title, 5))
            .to_request()
    };

    assert_eq!(
        test::call_service(&app, create("one")).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        test::call_service(&app, create("two")).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = TestRequest::post()
        .uri("/api/v1/admin/reset-ad-counter")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "Ad creation counter has been reset");

    assert_eq!(
        test::call_service(&app, create("two")).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(service.quota_status().await.unwrap().used, 1);
}

// =============================================================================
// GET /health
// =============================================================================

#[actix_rt::test]
async fn test_health_reports_backend_and_quota() {
    let service = new_service(3000);
    assert!(service.store().check_and_increment().await.unwrap());
    let app = init_app!(service);

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");
    assert_eq!(body["quota"]["used"], 1);
    assert_eq!(body["quota"]["limit"], 3000);
    assert!(body["uptime_seconds"].is_u64());
    assert!(body.get("error").is_none());
}

#[actix_rt::test]
async fn test_liveness() {
    let service = new_service(10);
    let app = init_app!(service);

    let req = TestRequest::get().uri("/health/live").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
