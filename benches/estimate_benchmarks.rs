//! Performance benchmarks for the fee engine.
//!
//! Covers the pure batch pipeline at several catalog sizes and one full
//! HTTP round trip through the router.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use fba_fee_engine::api::{AppState, create_router};
use fba_fee_engine::calculation::{EstimateOptions, estimate_catalog};
use fba_fee_engine::config::ConfigLoader;
use fba_fee_engine::models::CatalogRecord;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/fba").expect("Failed to load config")
}

/// Builds a mixed catalog: US standard, US oversize, and EU parcels.
fn create_catalog(size: usize) -> Vec<CatalogRecord> {
    (0..size)
        .map(|i| {
            let text = |s: &str| Some(s.to_string());
            match i % 3 {
                0 => CatalogRecord {
                    id: Some(format!("US{:05}", i)),
                    price: text("19.99"),
                    longest_side: text("16"),
                    median_side: text("10"),
                    shortest_side: text("4"),
                    dimension_unit: text("inches"),
                    weight: text("4"),
                    weight_unit: text("pounds"),
                    marketplace: text("US"),
                },
                1 => CatalogRecord {
                    id: Some(format!("OS{:05}", i)),
                    price: text("80"),
                    longest_side: text("60"),
                    median_side: text("30"),
                    shortest_side: text("20"),
                    dimension_unit: text("inches"),
                    weight: text("60"),
                    weight_unit: text("pounds"),
                    marketplace: text("US"),
                },
                _ => CatalogRecord {
                    id: Some(format!("EU{:05}", i)),
                    price: None,
                    longest_side: text("50"),
                    median_side: text("30"),
                    shortest_side: text("20"),
                    dimension_unit: text("centimeters"),
                    weight: text("10000"),
                    weight_unit: text("grams"),
                    marketplace: text(if i % 2 == 0 { "DE" } else { "GB" }),
                },
            }
        })
        .collect()
}

/// Benchmark: batch estimation at increasing catalog sizes.
fn bench_batch_scaling(c: &mut Criterion) {
    let loader = load_config();
    let options = EstimateOptions::default();

    let mut group = c.benchmark_group("batch_estimate");
    for size in [1usize, 100, 1000] {
        let catalog = create_catalog(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("records", size), &catalog, |b, catalog| {
            b.iter(|| black_box(estimate_catalog(loader.config(), catalog, &options).unwrap()))
        });
    }
    group.finish();
}

/// Benchmark: batch estimation with lookup traces attached.
fn bench_batch_with_trace(c: &mut Criterion) {
    let loader = load_config();
    let catalog = create_catalog(100);
    let options = EstimateOptions {
        include_trace: true,
        ..Default::default()
    };

    c.bench_function("batch_100_with_trace", |b| {
        b.iter(|| black_box(estimate_catalog(loader.config(), &catalog, &options).unwrap()))
    });
}

/// Benchmark: one POST /estimate round trip with 10 items.
fn bench_http_estimate(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(load_config()));
    let body = serde_json::json!({ "items": create_catalog(10) }).to_string();

    c.bench_function("http_estimate_10", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/estimate")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_batch_scaling,
    bench_batch_with_trace,
    bench_http_estimate,
);
criterion_main!(benches);
