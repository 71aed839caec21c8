//! Integration tests for the fee engine HTTP API.
//!
//! These tests drive the router against the shipped `config/fba`
//! configuration and cover:
//! - US standard-size items under both US regimes
//! - Price bucket selection
//! - The European end-to-end case
//! - Weight fallback for heavy oversize items
//! - Removal and multi-channel fees
//! - Per-record failures and request errors
//! - The CSV endpoint and the regime listing

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use fba_fee_engine::api::{AppState, create_router};
use fba_fee_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/fba").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

/// Normalize decimal string by removing trailing zeros after decimal point
fn normalize_decimal(s: &str) -> String {
    Decimal::from_str(s).unwrap().normalize().to_string()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_estimate(router: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/estimate")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

fn us_item(id: &str, price: &str, sides: [&str; 3], pounds: &str) -> Value {
    json!({
        "fnsku": id,
        "sales-price": price,
        "longest-side": sides[0],
        "median-side": sides[1],
        "shortest-side": sides[2],
        "unit-of-dimension": "inches",
        "item-package-weight": pounds,
        "unit-of-weight": "pounds",
        "amazon-store": "US"
    })
}

fn eu_item(id: &str, store: &str) -> Value {
    json!({
        "fnsku": id,
        "longest-side": "50",
        "median-side": "30",
        "shortest-side": "20",
        "unit-of-dimension": "centimeters",
        "item-package-weight": "10000",
        "unit-of-weight": "grams",
        "amazon-store": store
    })
}

fn regime<'a>(record: &'a Value, id: &str) -> &'a Value {
    record["regimes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["regime"] == id)
        .unwrap_or_else(|| panic!("regime {} missing from {}", id, record))
}

fn period_fee<'a>(estimate: &'a Value, period: &str) -> &'a Value {
    estimate["fulfillment_fees"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["period"] == period)
        .unwrap_or_else(|| panic!("period {} missing", period))
}

fn assert_decimal(value: &Value, expected: &str) {
    let actual = value
        .as_str()
        .unwrap_or_else(|| panic!("Expected a decimal string, got {}", value));
    assert_eq!(
        normalize_decimal(actual),
        normalize_decimal(expected),
        "Expected {}, got {}",
        expected,
        actual
    );
}

// =============================================================================
// SECTION 1: US Standard-Size Items
// =============================================================================

#[tokio::test]
async fn test_large_standard_under_both_us_regimes() {
    // 16 x 10 x 4 in, 4 lb: dimensional weight 640 / 139 = 4.604 lb wins
    let router = create_router_for_test();
    let body = json!({
        "items": [us_item("X001", "20", ["16", "10", "4"], "4")],
        "regimes": ["US-2024", "US-2026"]
    });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let record = &result["records"][0];
    for id in ["US-2024", "US-2026"] {
        let estimate = regime(record, id);
        assert_eq!(estimate["size_category"], "大号标准尺寸");
        assert_decimal(&estimate["shipping_weight"], "4.604");
        assert_decimal(&estimate["volumetric_weight"], "4.604");
        assert_eq!(estimate["bucket"], "[10,50]");
        // 6.92 + 0.08 * (4.604 - 3) * 2
        assert_decimal(&period_fee(estimate, "2024Q1")["fee"], "7.18");
        assert_decimal(&period_fee(estimate, "2024Q3")["fee"], "7.25");
    }
}

#[tokio::test]
async fn test_small_standard_bills_actual_weight() {
    let router = create_router_for_test();
    let body = json!({
        "items": [us_item("X002", "19.99", ["12", "9", "0.5"], "0.4")],
        "regimes": ["US-2026"]
    });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let estimate = regime(&result["records"][0], "US-2026");
    assert_eq!(estimate["size_category"], "小号标准尺寸");
    assert_decimal(&estimate["shipping_weight"], "0.4");
    assert_decimal(&period_fee(estimate, "2024Q1")["fee"], "3.15");
}

#[tokio::test]
async fn test_low_price_uses_discounted_bucket() {
    let router = create_router_for_test();
    let body = json!({
        "items": [us_item("X003", "8", ["12", "9", "0.5"], "0.4")],
        "regimes": ["US-2024"],
        "periods": ["2024Q1"]
    });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let estimate = regime(&result["records"][0], "US-2024");
    assert_eq!(estimate["bucket"], "<10");
    assert_decimal(&period_fee(estimate, "2024Q1")["fee"], "2.38");
}

// =============================================================================
// SECTION 2: European Regime
// =============================================================================

#[tokio::test]
async fn test_eu_light_standard_bulky_end_to_end() {
    let router = create_router_for_test();
    let body = json!({
        "items": [eu_item("E001", "DE"), eu_item("E002", "GB")],
        "regimes": ["EU"]
    });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let de = regime(&result["records"][0], "EU");
    assert_eq!(de["size_category"], "轻型标准大件");
    assert_decimal(&de["volumetric_weight"], "6000");
    assert_decimal(&de["shipping_weight"], "10000");
    assert_eq!(de["bucket"], "德国");
    assert_decimal(&period_fee(de, "2024Q1")["fee"], "8.47");
    assert_decimal(&period_fee(de, "2024Q3")["fee"], "8.52");

    let gb = regime(&result["records"][1], "EU");
    assert_eq!(gb["bucket"], "英国");
    assert_decimal(&period_fee(gb, "2024Q1")["fee"], "7.69");
}

#[tokio::test]
async fn test_eu_unknown_marketplace_keeps_classification() {
    let router = create_router_for_test();
    let body = json!({ "items": [eu_item("E003", "FR")], "regimes": ["EU"] });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let estimate = regime(&result["records"][0], "EU");
    assert_eq!(estimate["size_category"], "轻型标准大件");
    assert!(estimate["issue"].as_str().unwrap().contains("FR"));
    assert!(period_fee(estimate, "2024Q1")["fee"].is_null());
}

// =============================================================================
// SECTION 3: Oversize and Weight Fallback
// =============================================================================

#[tokio::test]
async fn test_heavy_oversize_falls_back_to_volumetric_weight() {
    // 60 x 30 x 20 in, 60 lb: classified on 258.99 lb dimensional weight, so
    // the >150 lb band applies, but that band bills on actual weight (60 lb)
    // which misses its own ">150" row. The volumetric candidate matches.
    let router = create_router_for_test();
    let body = json!({
        "items": [us_item("X010", "80", ["60", "30", "20"], "60")],
        "regimes": ["US-2024"],
        "periods": ["2024Q1"],
        "include_trace": true
    });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let estimate = regime(&result["records"][0], "US-2024");
    assert_eq!(estimate["size_category"], "超大件(>150磅)");
    assert_decimal(&estimate["shipping_weight"], "60");
    assert_eq!(estimate["bucket"], ">50");

    let fee = period_fee(estimate, "2024Q1");
    // 194.95 + 0.19 * (258.9928 - 151)
    assert_decimal(&fee["fee"], "215.47");

    let attempts = fee["trace"]["attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0]["source"], "shipping");
    assert_eq!(attempts[0]["outcome"], "no_range_matched");
    assert_eq!(attempts[1]["source"], "volumetric");
    assert_eq!(attempts[1]["outcome"], "matched");
}

#[tokio::test]
async fn test_traces_are_omitted_by_default() {
    let router = create_router_for_test();
    let body = json!({ "items": [us_item("X001", "20", ["16", "10", "4"], "4")] });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let estimate = regime(&result["records"][0], "US-2024");
    assert!(period_fee(estimate, "2024Q1").get("trace").is_none());
}

// =============================================================================
// SECTION 4: Removal and Multi-Channel Fees
// =============================================================================

#[tokio::test]
async fn test_us_2026_adds_removal_and_channel_fees() {
    let router = create_router_for_test();
    let body = json!({ "items": [us_item("X001", "20", ["16", "10", "4"], "4")] });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let record = &result["records"][0];

    let us_2026 = regime(record, "US-2026");
    // 2.89 + 1.06 * (4.604 - 2)
    assert_decimal(&us_2026["removal_fee"], "5.65");
    let channel = us_2026["channel_fees"].as_array().unwrap();
    assert_eq!(channel.len(), 2);
    assert_eq!(channel[0]["speed"], "standard");
    assert_decimal(&channel[0]["fee"], "11.20");
    assert_eq!(channel[1]["speed"], "express");
    assert_decimal(&channel[1]["fee"], "15.34");

    let us_2024 = regime(record, "US-2024");
    assert!(us_2024.get("removal_fee").is_none());
    assert!(us_2024.get("channel_fees").is_none());
}

// =============================================================================
// SECTION 5: Batch Behaviour
// =============================================================================

#[tokio::test]
async fn test_invalid_record_does_not_abort_batch() {
    let router = create_router_for_test();
    let mut broken = us_item("X005", "20", ["16", "10", "4"], "4");
    broken["item-package-weight"] = json!("heavy");
    let body = json!({
        "items": [us_item("X001", "20", ["16", "10", "4"], "4"), broken, eu_item("E001", "DE")]
    });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let records = result["records"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1]["item_id"], "X005");
    assert!(records[1]["error"].as_str().unwrap().contains("item-package-weight"));
    assert!(records[1]["regimes"].as_array().unwrap().is_empty());
    assert_eq!(records[2]["regimes"].as_array().unwrap().len(), 3);

    assert_eq!(result["summary"]["total_records"], 3);
    assert_eq!(result["summary"]["failed_records"], 1);
}

#[tokio::test]
async fn test_regimes_are_reported_in_configured_order() {
    let router = create_router_for_test();
    let body = json!({ "items": [eu_item("E001", "DE")] });

    let (status, result) = post_estimate(router, body).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = result["records"][0]["regimes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["regime"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["US-2024", "US-2026", "EU"]);
}

#[tokio::test]
async fn test_identical_requests_give_identical_records() {
    let body = json!({
        "items": [
            us_item("X001", "20", ["16", "10", "4"], "4"),
            us_item("X010", "80", ["60", "30", "20"], "60"),
            eu_item("E001", "GB")
        ],
        "include_trace": true
    });

    let (_, first) = post_estimate(create_router_for_test(), body.clone()).await;
    let (_, second) = post_estimate(create_router_for_test(), body).await;

    assert_eq!(first["records"], second["records"]);
    assert_eq!(first["summary"], second["summary"]);
    assert_ne!(first["request_id"], second["request_id"]);
}

// =============================================================================
// SECTION 6: CSV Endpoint and Regime Listing
// =============================================================================

#[tokio::test]
async fn test_csv_catalog_upload() {
    let csv_body = "\
fnsku,sales-price,longest-side,median-side,shortest-side,unit-of-dimension,item-package-weight,unit-of-weight,amazon-store
X001,20,16,10,4,inches,4,pounds,US
E001,,50,30,20,centimeters,10000,grams,DE
";
    let request = Request::builder()
        .method("POST")
        .uri("/estimate/csv?regimes=US-2024,EU&periods=2024Q1")
        .header("Content-Type", "text/csv")
        .body(Body::from(csv_body))
        .unwrap();

    let (status, result) = send(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    let records = result["records"].as_array().unwrap();
    assert_decimal(&period_fee(regime(&records[0], "US-2024"), "2024Q1")["fee"], "7.18");
    assert_decimal(&period_fee(regime(&records[1], "EU"), "2024Q1")["fee"], "8.47");
}

#[tokio::test]
async fn test_regimes_endpoint() {
    let request = Request::builder()
        .uri("/regimes")
        .body(Body::empty())
        .unwrap();

    let (status, result) = send(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["name"], "FBA fee schedules");
    assert_eq!(result["default_periods"], json!(["2024Q1", "2024Q2", "2024Q3"]));
    let regimes = result["regimes"].as_array().unwrap();
    assert_eq!(regimes.len(), 3);
    assert_eq!(regimes[1]["id"], "US-2026");
    assert_eq!(regimes[1]["removal_fees"], true);
    assert!(regimes[1]["channel_rows"].as_u64().unwrap() > 0);
    assert_eq!(regimes[0]["channel_rows"], 0);
    assert_eq!(regimes[2]["weight_unit"], "grams");
}

// =============================================================================
// SECTION 7: Error Cases
// =============================================================================

#[tokio::test]
async fn test_unknown_regime_returns_400() {
    let body = json!({ "items": [eu_item("E001", "DE")], "regimes": ["JP-2025"] });

    let (status, result) = post_estimate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "REGIME_NOT_FOUND");
}

#[tokio::test]
async fn test_missing_items_returns_validation_error() {
    let (status, result) = post_estimate(create_router_for_test(), json!({ "regimes": ["EU"] })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/estimate")
        .header("Content-Type", "application/json")
        .body(Body::from("{\"items\": [}"))
        .unwrap();

    let (status, result) = send(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_missing_content_type_returns_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/estimate")
        .body(Body::from(json!({ "items": [] }).to_string()))
        .unwrap();

    let (status, result) = send(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "MISSING_CONTENT_TYPE");
}
