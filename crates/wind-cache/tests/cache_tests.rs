//! Integration tests for the wind field cache.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use test_utils::{fixtures, uniform_field};
use wind_cache::{CacheConfig, CacheStatus, FieldCache};
use wind_common::{BoundingBox, SourceSelection, WindSource};

fn cache(capacity: usize, ttl_secs: u64) -> FieldCache {
    FieldCache::new(&CacheConfig {
        capacity,
        ttl_secs,
        snap_grid_deg: 0.5,
    })
}

// ============================================================================
// TTL tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_entry_served_within_ttl_then_purged() {
    let cache = cache(10, 1800);
    let key = cache.key_for(
        SourceSelection::Auto,
        &fixtures::bbox::sri_lanka(),
        fixtures::time::reference_time(),
        25.0,
    );
    let field = Arc::new(uniform_field(fixtures::bbox::sri_lanka(), 0.5, 4.0, -2.0));

    cache.set(&key, field.clone()).await;

    tokio::time::advance(Duration::from_secs(1799)).await;
    let hit = cache.get(&key).await.expect("entry should still be live");
    assert_eq!(*hit, *field);

    tokio::time::advance(Duration::from_secs(2)).await;
    assert!(cache.get(&key).await.is_none());
    assert_eq!(cache.len().await, 0, "expired entry should be purged");
    assert_eq!(cache.stats().expired, 1);
}

// ============================================================================
// Eviction tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_full_cache_evicts_oldest_inserted_not_least_recent() {
    let cache = cache(2, 3600);
    let keys: Vec<_> = [10.0, 20.0, 30.0]
        .iter()
        .map(|&res| {
            cache.key_for(
                SourceSelection::Auto,
                &fixtures::bbox::small(),
                fixtures::time::reference_time(),
                res,
            )
        })
        .collect();
    let field = Arc::new(uniform_field(fixtures::bbox::small(), 0.5, 1.0, 1.0));

    cache.set(&keys[0], field.clone()).await;
    tokio::time::advance(Duration::from_millis(10)).await;
    cache.set(&keys[1], field.clone()).await;

    // Reading the oldest entry must not protect it
    assert!(cache.get(&keys[0]).await.is_some());

    tokio::time::advance(Duration::from_millis(10)).await;
    cache.set(&keys[2], field).await;

    assert_eq!(cache.len().await, 2);
    assert!(cache.get(&keys[0]).await.is_none());
    assert!(cache.get(&keys[1]).await.is_some());
    assert!(cache.get(&keys[2]).await.is_some());
    assert_eq!(cache.stats().evictions, 1);
}

// ============================================================================
// get_cached_wind_field tests
// ============================================================================

#[tokio::test]
async fn test_miss_then_hit_calls_fetcher_once() {
    let cache = cache(10, 1800);
    let calls = AtomicUsize::new(0);
    let bbox = fixtures::bbox::sri_lanka();
    let time = fixtures::time::reference_time();

    let first = cache
        .get_cached_wind_field(SourceSelection::Auto, &bbox, time, 25.0, |key| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { uniform_field(key.bbox, 0.5, 2.0, 2.0) }
        })
        .await;
    assert_eq!(first.status, CacheStatus::Miss);

    let second = cache
        .get_cached_wind_field(SourceSelection::Auto, &bbox, time, 25.0, |key| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { uniform_field(key.bbox, 0.5, 9.0, 9.0) }
        })
        .await;
    assert_eq!(second.status, CacheStatus::Hit);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*first.field, *second.field);
}

#[tokio::test]
async fn test_refused_field_is_not_stored() {
    let cache = cache(10, 1800);
    let calls = AtomicUsize::new(0);
    let bbox = fixtures::bbox::sri_lanka();
    let time = fixtures::time::reference_time();

    for _ in 0..2 {
        let result = cache
            .get_cached_wind_field_if(
                SourceSelection::Auto,
                &bbox,
                time,
                25.0,
                |key| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { uniform_field(key.bbox, 0.5, 0.0, 0.0) }
                },
                |field| field.metadata.max_speed > 0.0,
            )
            .await;
        assert_eq!(result.status, CacheStatus::Bypass);
        assert!(!result.field.is_empty());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(cache.is_empty().await);
    assert_eq!(cache.stats().misses, 2);
}

#[tokio::test]
async fn test_fetcher_receives_normalized_parameters() {
    let cache = cache(10, 1800);
    let requested = BoundingBox::new(79.6, 5.9, 81.9, 9.7);
    let time = fixtures::time::reference_time() + chrono::Duration::minutes(42);

    let result = cache
        .get_cached_wind_field(
            SourceSelection::Provider(WindSource::Gfs),
            &requested,
            time,
            25.0,
            |key| async move {
                assert_eq!(key.bbox, BoundingBox::new(79.5, 5.5, 82.0, 10.0));
                assert_eq!(key.time, fixtures::time::reference_time());
                uniform_field(key.bbox, 0.5, 1.0, 0.0)
            },
        )
        .await;

    assert_eq!(result.field.metadata.bbox, BoundingBox::new(79.5, 5.5, 82.0, 10.0));
}

#[tokio::test]
async fn test_nearby_requests_share_an_entry() {
    let cache = cache(10, 1800);
    let base = fixtures::time::reference_time();

    cache
        .get_cached_wind_field(
            SourceSelection::Auto,
            &BoundingBox::new(79.51, 5.91, 81.99, 9.99),
            base + chrono::Duration::minutes(5),
            25.0,
            |key| async move { uniform_field(key.bbox, 0.5, 1.0, 0.0) },
        )
        .await;

    let second = cache
        .get_cached_wind_field(
            SourceSelection::Auto,
            &BoundingBox::new(79.74, 5.62, 81.51, 9.51),
            base + chrono::Duration::minutes(55),
            25.0,
            |key| async move { uniform_field(key.bbox, 0.5, 7.0, 0.0) },
        )
        .await;

    assert_eq!(second.status, CacheStatus::Hit);
    assert_eq!(cache.len().await, 1);
}
