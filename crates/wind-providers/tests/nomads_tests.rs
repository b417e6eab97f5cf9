//! NOMADS adapter against a local mock DODS server.

use std::sync::{Arc, Mutex};

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use chrono::{Duration, Utc};
use test_utils::{assert_speed_consistent, fixtures};
use wind_common::{WindRequest, WindSource};
use wind_providers::{NomadsProvider, ProviderError, ProviderSettings, WindProvider};

#[derive(Clone, Copy)]
enum Mode {
    /// The newest cycle 404s, earlier ones serve data.
    NewestNotFound,
    /// The newest cycle answers with a GrADS error body.
    NewestNotAvailable,
    /// No cycle is published.
    NothingPublished,
}

#[derive(Clone)]
struct MockServer {
    mode: Mode,
    /// Dataset path of every request, in order.
    paths: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    fn distinct_cycles(&self) -> Vec<String> {
        let mut cycles: Vec<String> = Vec::new();
        for path in self.paths() {
            if !cycles.contains(&path) {
                cycles.push(path);
            }
        }
        cycles
    }
}

/// One row over two longitudes, inside the small fixture box.
fn slab(variable: &str, value: f64) -> String {
    format!(
        "{var}, [1][1][2]\n[0][0], {v:.2}, {v:.2}\n\ntime, [1]\n739589.25\nlat, [1]\n1.0\nlon, [2]\n1.0, 1.25\n",
        var = variable,
        v = value
    )
}

async fn dods(State(server): State<MockServer>, OriginalUri(uri): OriginalUri) -> Response {
    let path = uri.path().to_string();
    let newest = {
        let mut paths = server.paths.lock().unwrap();
        paths.push(path.clone());
        paths.first() == Some(&path)
    };

    match server.mode {
        Mode::NothingPublished => return StatusCode::NOT_FOUND.into_response(),
        Mode::NewestNotFound if newest => return StatusCode::NOT_FOUND.into_response(),
        Mode::NewestNotAvailable if newest => {
            return "Error { code = 0; message = \"gfs_0p25 is not an available dataset\"; }"
                .into_response()
        }
        _ => {}
    }

    let query = uri.query().unwrap_or_default();
    if query.starts_with("ugrd10m") {
        slab("ugrd10m", 4.0).into_response()
    } else {
        slab("vgrd10m", -1.0).into_response()
    }
}

async fn spawn(mode: Mode) -> (String, MockServer) {
    let server = MockServer {
        mode,
        paths: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new().fallback(dods).with_state(server.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/dods/gfs_0p25", addr), server)
}

fn provider(base_url: String) -> NomadsProvider {
    let settings = ProviderSettings {
        base_url: Some(base_url),
        timeout_secs: Some(5),
        ..ProviderSettings::default()
    };
    NomadsProvider::new(&settings, 2500).unwrap()
}

fn request() -> WindRequest {
    WindRequest::new(fixtures::bbox::small(), 25.0).with_time(Utc::now() + Duration::hours(3))
}

// ============================================================================
// Cycle fallback tests
// ============================================================================

#[tokio::test]
async fn test_unpublished_cycle_falls_back_to_previous() {
    let (url, server) = spawn(Mode::NewestNotFound).await;
    let nomads = provider(url);

    let field = nomads.fetch_wind_field(&request()).await.unwrap();

    assert_eq!(field.source(), WindSource::Nomads);
    assert_eq!(field.len(), 2);
    assert!(field.points.iter().all(|p| (p.u - 4.0).abs() < 1e-9 && (p.v + 1.0).abs() < 1e-9));
    assert_speed_consistent!(field);

    // One u request against the missing cycle, then u and v against the previous one
    let cycles = server.distinct_cycles();
    assert_eq!(server.paths().len(), 3);
    assert_eq!(cycles.len(), 2);
    assert_ne!(cycles[0], cycles[1]);
}

#[tokio::test]
async fn test_dataset_error_body_falls_back_to_previous() {
    let (url, server) = spawn(Mode::NewestNotAvailable).await;
    let nomads = provider(url);

    let field = nomads.fetch_wind_field(&request()).await.unwrap();

    assert_eq!(field.len(), 2);
    assert_eq!(server.distinct_cycles().len(), 2);
}

#[tokio::test]
async fn test_gives_up_after_a_day_of_cycles() {
    let (url, server) = spawn(Mode::NothingPublished).await;
    let nomads = provider(url);

    let err = nomads.fetch_wind_field(&request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::FetchFailed(_)));
    assert!(!err.is_rate_limited());
    assert_eq!(server.distinct_cycles().len(), 4);
    assert_eq!(server.paths().len(), 4);
}

#[tokio::test]
async fn test_prime_meridian_is_unavailable() {
    let (url, server) = spawn(Mode::NewestNotFound).await;
    let nomads = provider(url);

    let request = WindRequest::new(fixtures::bbox::prime_meridian(), 25.0);
    let err = nomads.fetch_wind_field(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::Unavailable(_)));
    assert!(server.paths().is_empty());
}
