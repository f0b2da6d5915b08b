//! SpaceX client and payload lookup against a local HTTP fixture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use landing_common::config::ApiConfig;
use landing_etl::models::parse_launch_batch;
use landing_etl::services::{fetch_payload_lookup, ClientError, SpaceXClient};
use landing_etl::{clean_api_data, ImputationPolicy};
use serde_json::{json, Value};

fn launches() -> Value {
    json!([
        {
            "flight_number": 1,
            "name": "FalconSat",
            "date_utc": "2006-03-24T22:30:00.000Z",
            "launchpad": {"id": "kwajalein"},
            "payloads": ["p1"],
            "cores": [{"flight": 1, "gridfins": false, "legs": false, "reused": false, "landing_success": null}]
        },
        {
            "flight_number": 2,
            "name": "CRS-1",
            "date_utc": "2012-10-08T00:35:00.000Z",
            "launchpad": {"id": "ccafs"},
            "payloads": ["p2"],
            "cores": [{"flight": 1, "gridfins": true, "legs": true, "reused": false, "landing_success": true}]
        }
    ])
}

fn payloads() -> Value {
    json!([
        {"id": "p1", "mass_kg": 20.0, "orbit": "LEO", "customers": ["DARPA"]},
        {"id": "p2", "mass_kg": null, "orbit": "ISS"}
    ])
}

/// Serve `router` on an ephemeral port; returns the base URL
async fn spawn_fixture(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client_for(base: &str) -> SpaceXClient {
    SpaceXClient::new(&ApiConfig {
        launches_url: format!("{}/v4/launches", base),
        payloads_url: format!("{}/v4/payloads", base),
        timeout_secs: 5,
        ..ApiConfig::default()
    })
    .unwrap()
}

fn healthy_router() -> Router {
    Router::new()
        .route("/v4/launches", get(|| async { Json(launches()) }))
        .route("/v4/payloads", get(|| async { Json(payloads()) }))
}

#[tokio::test]
async fn test_fetch_launches_and_payloads() {
    let base = spawn_fixture(healthy_router()).await;
    let client = client_for(&base);

    let raw = client.fetch_launches().await.unwrap();
    assert_eq!(raw.len(), 2);

    let payloads = client.fetch_payloads().await.unwrap();
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0].mass_kg, Some(20.0));
    assert_eq!(payloads[1].mass_kg, None);
    assert_eq!(payloads[1].orbit.as_deref(), Some("ISS"));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let router = Router::new().route(
        "/v4/payloads",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
    );
    let base = spawn_fixture(router).await;

    match client_for(&base).fetch_payloads().await {
        Err(ClientError::ApiError(status, body)) => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream down");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bad_body_maps_to_parse_error() {
    let router = Router::new().route("/v4/payloads", get(|| async { "not json" }));
    let base = spawn_fixture(router).await;

    let result = client_for(&base).fetch_payloads().await;
    assert!(matches!(result, Err(ClientError::ParseError(_))));
}

#[tokio::test]
async fn test_lookup_failure_degrades_to_empty() {
    let router = Router::new().route(
        "/v4/payloads",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "") }),
    );
    let base = spawn_fixture(router).await;

    let lookup = fetch_payload_lookup(&client_for(&base)).await;
    assert!(lookup.is_empty());
}

#[tokio::test]
async fn test_lookup_issues_one_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/v4/payloads",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(payloads())
            }
        }),
    );
    let base = spawn_fixture(router).await;

    let lookup = fetch_payload_lookup(&client_for(&base)).await;
    assert_eq!(lookup.len(), 2);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_clean_api_data_end_to_end() {
    let base = spawn_fixture(healthy_router()).await;
    let client = client_for(&base);

    let raw = client.fetch_launches().await.unwrap();
    let records = parse_launch_batch(Value::Array(raw)).unwrap();
    let cleaned = clean_api_data(&client, &records, &ImputationPolicy::default()).await;

    assert_eq!(cleaned.records.len(), 2);
    let first = &cleaned.records[0];
    assert_eq!(first.payload_mass, 20.0);
    assert_eq!(first.orbit, "LEO");
    assert_eq!(first.launch_site, "kwajalein");
    assert!(!first.outcome);
    assert_eq!(first.class, 0);

    let second = &cleaned.records[1];
    // Null mass is filled with the mean of the one defined mass
    assert_eq!(second.payload_mass, 20.0);
    assert_eq!(second.orbit, "ISS");
    assert_eq!(second.class, 1);
    assert_eq!(cleaned.report.imputed_payload_masses, 1);
}

#[tokio::test]
async fn test_clean_api_data_with_unreachable_payloads() {
    let router = Router::new().route("/v4/launches", get(|| async { Json(launches()) }));
    let base = spawn_fixture(router).await;
    let client = client_for(&base);

    let raw = client.fetch_launches().await.unwrap();
    let records = parse_launch_batch(Value::Array(raw)).unwrap();
    // Payload route is absent, so the fixture answers 404
    let cleaned = clean_api_data(&client, &records, &ImputationPolicy::default()).await;

    assert_eq!(cleaned.records.len(), 2);
    assert!(cleaned.records.iter().all(|r| r.orbit == "Unknown"));
    assert!(cleaned.records.iter().all(|r| r.payload_mass == 0.0));
    assert!(cleaned.report.used_mass_fallback);
    let classes: Vec<u8> = cleaned.records.iter().map(|r| r.class).collect();
    assert_eq!(classes, vec![0, 1]);
}
