//! End-to-end animation sessions with in-process loaders.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use flow_animator::{run_session, CacheEngineLoader, SessionConfig};
use particle_flow::{FieldLoader, SimulatorConfig};
use test_utils::{fixtures, uniform_field};
use wind_cache::{CacheConfig, FieldCache};
use wind_common::{BoundingBox, WindField, WindRequest, WindSource};
use wind_providers::{ProviderRegistry, SyntheticConfig, SyntheticGenerator, WindFieldEngine};

/// Records every bbox it is asked for.
#[derive(Default)]
struct RecordingLoader {
    requests: Mutex<Vec<BoundingBox>>,
    loads: AtomicUsize,
}

#[async_trait]
impl FieldLoader for RecordingLoader {
    async fn load(&self, request: &WindRequest) -> Arc<WindField> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.bbox);
        }
        Arc::new(uniform_field(request.bbox, 0.25, 5.0, 2.0))
    }
}

fn session(output_dir: &std::path::Path) -> SessionConfig {
    let mut config = SessionConfig::new(
        WindRequest::new(fixtures::bbox::small(), 25.0),
        output_dir,
    );
    config.width = 120;
    config.height = 120;
    config.simulator = SimulatorConfig {
        particle_count: 150,
        seed: Some(5),
        ..SimulatorConfig::default()
    };
    config.fps = 10;
    config.debounce = Duration::from_millis(10);
    config
}

fn synthetic_engine() -> WindFieldEngine {
    let registry = Arc::new(ProviderRegistry::new(
        Vec::new(),
        Vec::new(),
        ChronoDuration::minutes(60),
    ));
    let synthetic = SyntheticGenerator::new(
        SyntheticConfig {
            seed: Some(1),
            ..SyntheticConfig::default()
        },
        2500,
    );
    WindFieldEngine::new(registry, synthetic)
}

// ============================================================================
// Session tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_session_writes_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = session(dir.path());
    config.frames = 20;
    config.snapshot_every = 5;

    let loader = Arc::new(RecordingLoader::default());
    let report = run_session(loader.clone(), config).await.unwrap();

    assert_eq!(report.frames, 20);
    assert_eq!(report.loads, 1);
    assert_eq!(report.snapshots.len(), 4);
    for path in &report.snapshots {
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
    assert!(report.snapshots[3].ends_with("frame_00020.png"));
}

#[tokio::test(start_paused = true)]
async fn test_session_without_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("unused");
    let mut config = session(&output);
    config.frames = 5;
    config.snapshot_every = 0;

    let report = run_session(Arc::new(RecordingLoader::default()), config)
        .await
        .unwrap();

    assert_eq!(report.frames, 5);
    assert!(report.snapshots.is_empty());
    assert!(!output.exists());
}

#[tokio::test(start_paused = true)]
async fn test_panning_reloads_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = session(dir.path());
    config.frames = 60;
    config.snapshot_every = 0;
    config.pan_deg = 0.5;
    config.pan_every = 20;

    let loader = Arc::new(RecordingLoader::default());
    let report = run_session(loader.clone(), config).await.unwrap();

    assert_eq!(report.frames, 60);
    // Initial load plus one per pan at frames 20 and 40
    assert_eq!(report.loads, 3);

    let requests = loader.requests.lock().unwrap().clone();
    assert_eq!(requests[0], BoundingBox::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(requests[1], BoundingBox::new(0.5, 0.0, 2.5, 2.0));
    assert_eq!(requests[2], BoundingBox::new(1.0, 0.0, 3.0, 2.0));
}

// ============================================================================
// Loader tests
// ============================================================================

#[tokio::test]
async fn test_cache_engine_loader_caches_fields() {
    let loader = CacheEngineLoader::new(FieldCache::new(&CacheConfig::default()), synthetic_engine());
    let request = WindRequest::new(fixtures::bbox::sri_lanka(), 25.0);

    let first = loader.load(&request).await;
    let second = loader.load(&request).await;

    assert_eq!(first.source(), WindSource::Mock);
    assert!(!first.is_empty());
    assert!(Arc::ptr_eq(&first, &second));

    let stats = loader.cache().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}
