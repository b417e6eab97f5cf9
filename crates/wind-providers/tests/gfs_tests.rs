//! GFS adapter against a local mock forecast server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use test_utils::{assert_speed_consistent, fixtures};
use wind_common::{WindRequest, WindSource};
use wind_grid::grid_dimensions;
use wind_providers::gfs::BATCH_SIZE;
use wind_providers::{GfsProvider, ProviderError, ProviderSettings, WindProvider};

#[derive(Clone)]
struct MockServer {
    mode: Mode,
    requests: Arc<AtomicUsize>,
    max_batch: Arc<AtomicUsize>,
}

#[derive(Clone, Copy)]
enum Mode {
    /// 5 m/s from the west at every location.
    Westerly,
    /// Well-formed series that only cover the small hours of the day.
    WrongHour,
    RateLimited,
    ApiError,
}

async fn forecast(
    State(server): State<MockServer>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    server.requests.fetch_add(1, Ordering::SeqCst);

    match server.mode {
        Mode::RateLimited => {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": true, "reason": "Minutely API request limit exceeded"})),
            )
                .into_response()
        }
        Mode::ApiError => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": true, "reason": "Parameter 'latitude' is invalid"})),
            )
                .into_response()
        }
        Mode::Westerly | Mode::WrongHour => {}
    }

    let count = params
        .get("latitude")
        .map(|lats| lats.split(',').count())
        .unwrap_or(0);
    server.max_batch.fetch_max(count, Ordering::SeqCst);
    let hour = params.get("start_hour").cloned().unwrap_or_default();

    let locations: Vec<_> = (0..count)
        .map(|_| match server.mode {
            Mode::WrongHour => {
                let day = hour.split('T').next().unwrap_or_default();
                json!({
                    "hourly": {
                        "time": [format!("{}T00:00", day), format!("{}T01:00", day)],
                        "wind_speed_10m": [99.0, 5.0],
                        "wind_direction_10m": [270.0, 270.0]
                    }
                })
            }
            _ => json!({
                "hourly": {
                    "time": [hour],
                    "wind_speed_10m": [5.0],
                    "wind_direction_10m": [270.0]
                }
            }),
        })
        .collect();
    Json(locations).into_response()
}

async fn spawn(mode: Mode) -> (String, MockServer) {
    let server = MockServer {
        mode,
        requests: Arc::new(AtomicUsize::new(0)),
        max_batch: Arc::new(AtomicUsize::new(0)),
    };
    let app = Router::new()
        .route("/v1/forecast", get(forecast))
        .with_state(server.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1/forecast", addr), server)
}

fn provider(base_url: String) -> GfsProvider {
    let settings = ProviderSettings {
        base_url: Some(base_url),
        timeout_secs: Some(5),
        ..ProviderSettings::default()
    };
    GfsProvider::new(&settings, 2500).unwrap()
}

#[tokio::test]
async fn test_fetch_batches_locations() {
    let (url, server) = spawn(Mode::Westerly).await;
    let gfs = provider(url);

    let bbox = fixtures::bbox::small();
    let request = WindRequest::new(bbox, 10.0);
    let field = gfs.fetch_wind_field(&request).await.unwrap();

    let dims = grid_dimensions(&bbox, 10.0);
    let expected_batches = (field.points.len() + BATCH_SIZE - 1) / BATCH_SIZE;
    assert!(field.points.len() > BATCH_SIZE);
    assert_eq!(server.requests.load(Ordering::SeqCst), expected_batches);
    assert_eq!(server.max_batch.load(Ordering::SeqCst), BATCH_SIZE);

    assert_eq!(field.source(), WindSource::Gfs);
    assert_eq!(field.metadata.grid_width, dims.width);
    assert_eq!(field.metadata.grid_height, dims.height);
    assert!(field.points.iter().all(|p| (p.u - 5.0).abs() < 1e-9 && p.v.abs() < 1e-9));
    assert_speed_consistent!(field);
}

#[tokio::test]
async fn test_series_without_requested_hour_gives_empty_field() {
    let (url, server) = spawn(Mode::WrongHour).await;
    let gfs = provider(url);

    // Reference time is midday, outside the served hours
    let request = WindRequest::new(fixtures::bbox::small(), 50.0)
        .with_time(fixtures::time::reference_time());
    let field = gfs.fetch_wind_field(&request).await.unwrap();

    assert!(server.requests.load(Ordering::SeqCst) >= 1);
    assert!(field.is_empty());
    assert_eq!(field.source(), WindSource::Gfs);
}

#[tokio::test]
async fn test_http_429_is_rate_limited() {
    let (url, _server) = spawn(Mode::RateLimited).await;
    let gfs = provider(url);

    let err = gfs
        .fetch_wind_field(&WindRequest::new(fixtures::bbox::small(), 50.0))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited(_)));
    assert!(err.is_rate_limited());
    assert!(err.to_string().contains("limit exceeded"));
}

#[tokio::test]
async fn test_api_error_is_fetch_failure() {
    let (url, server) = spawn(Mode::ApiError).await;
    let gfs = provider(url);

    let err = gfs
        .fetch_wind_field(&WindRequest::new(fixtures::bbox::small(), 50.0))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::FetchFailed(_)));
    assert!(err.to_string().contains("HTTP 400"));
    assert!(!err.is_rate_limited());
    // Fails on the first batch, no further requests
    assert_eq!(server.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_server_is_an_error() {
    let gfs = provider("http://127.0.0.1:9/v1/forecast".to_string());
    let result = gfs
        .fetch_wind_field(&WindRequest::new(fixtures::bbox::small(), 50.0))
        .await;
    assert!(result.is_err());
}
