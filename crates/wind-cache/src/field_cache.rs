//! TTL store for assembled wind fields.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};
use wind_common::{BoundingBox, SourceSelection, WindField};

use crate::config::CacheConfig;
use crate::key::CacheKey;

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Fetched on a miss but refused by the store predicate, so not kept.
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Bypass => "bypass",
        }
    }
}

/// Result of [`FieldCache::get_cached_wind_field`].
#[derive(Debug, Clone)]
pub struct CachedField {
    pub field: Arc<WindField>,
    pub status: CacheStatus,
    pub key: CacheKey,
    /// When the entry expires.
    pub expires_at: DateTime<Utc>,
}

struct CacheEntry {
    field: Arc<WindField>,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    inserted: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted.elapsed() >= ttl
    }
}

/// Lock-free counters behind [`FieldCache::stats`].
#[derive(Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expired: AtomicU64,
}

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to make room for new ones.
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed.
    pub expired: u64,
    /// Hits as a percentage of lookups (0-100).
    pub hit_rate: f64,
}

/// In-memory TTL cache keyed by normalized request parameters.
///
/// Cheap to share: wrap in an `Arc` and hand it to every consumer.
pub struct FieldCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    capacity: usize,
    ttl: Duration,
    snap_grid_deg: f64,
    counters: CacheCounters,
}

impl FieldCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            capacity: config.capacity.max(1),
            ttl: Duration::from_secs(config.ttl_secs),
            snap_grid_deg: config.snap_grid_deg,
            counters: CacheCounters::default(),
        }
    }

    /// Build the normalized key this cache would use for a request.
    pub fn key_for(
        &self,
        source: SourceSelection,
        bbox: &BoundingBox,
        time: DateTime<Utc>,
        resolution_km: f64,
    ) -> CacheKey {
        CacheKey::new(source, bbox, time, resolution_km, self.snap_grid_deg)
    }

    /// Stored field for `key`, or `None` when absent or expired.
    ///
    /// An expired entry is removed as a side effect.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<WindField>> {
        self.get_entry(key).await.map(|(field, _)| field)
    }

    async fn get_entry(&self, key: &CacheKey) -> Option<(Arc<WindField>, DateTime<Utc>)> {
        {
            let entries = self.entries.read().await;
            match entries.get(key.as_str()) {
                Some(entry) if !entry.is_expired(self.ttl) => {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    counter!("wind_cache_hits_total").increment(1);
                    return Some((entry.field.clone(), entry.expires_at));
                }
                Some(_) => {}
                None => {
                    self.record_miss();
                    return None;
                }
            }
        }

        // Expired: re-check under the write lock, a concurrent set may have refreshed it
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key.as_str()) {
            if !entry.is_expired(self.ttl) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                counter!("wind_cache_hits_total").increment(1);
                return Some((entry.field.clone(), entry.expires_at));
            }
            entries.remove(key.as_str());
            self.counters.expired.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Wind cache entry expired");
        }
        self.record_miss();
        None
    }

    fn record_miss(&self) {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        counter!("wind_cache_misses_total").increment(1);
    }

    /// Store `field` under `key`, returning its expiry time.
    ///
    /// When the cache is full and `key` is new, the entry with the oldest
    /// insertion time is evicted first.
    pub async fn set(&self, key: &CacheKey, field: Arc<WindField>) -> DateTime<Utc> {
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::zero());

        let mut entries = self.entries.write().await;

        if !entries.contains_key(key.as_str()) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| (entry.cached_at, entry.inserted))
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                self.counters.evictions.fetch_add(1, Ordering::Relaxed);
                counter!("wind_cache_evictions_total").increment(1);
                debug!(evicted = %oldest, "Wind cache full, evicted oldest entry");
            }
        }

        entries.insert(
            key.as_str().to_string(),
            CacheEntry {
                field,
                cached_at: now,
                expires_at,
                inserted: Instant::now(),
            },
        );
        expires_at
    }

    /// Cached field for the request, fetching and storing it on a miss.
    ///
    /// `fetcher` receives the normalized key, so it fetches the snapped box at
    /// the rounded hour the entry will be served for. Concurrent misses for
    /// the same key each call their fetcher; the last one stored wins.
    pub async fn get_cached_wind_field<F, Fut>(
        &self,
        source: SourceSelection,
        bbox: &BoundingBox,
        time: DateTime<Utc>,
        resolution_km: f64,
        fetcher: F,
    ) -> CachedField
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = WindField>,
    {
        self.get_cached_wind_field_if(source, bbox, time, resolution_km, fetcher, |_| true)
            .await
    }

    /// Like [`FieldCache::get_cached_wind_field`], but a freshly fetched field
    /// is only stored when `keep` accepts it. A refused field is still
    /// returned, with [`CacheStatus::Bypass`] and an expiry of now.
    pub async fn get_cached_wind_field_if<F, Fut, P>(
        &self,
        source: SourceSelection,
        bbox: &BoundingBox,
        time: DateTime<Utc>,
        resolution_km: f64,
        fetcher: F,
        keep: P,
    ) -> CachedField
    where
        F: FnOnce(CacheKey) -> Fut,
        Fut: Future<Output = WindField>,
        P: FnOnce(&WindField) -> bool,
    {
        let key = self.key_for(source, bbox, time, resolution_km);

        if let Some((field, expires_at)) = self.get_entry(&key).await {
            debug!(key = %key, "Wind cache hit");
            return CachedField {
                field,
                status: CacheStatus::Hit,
                key,
                expires_at,
            };
        }

        let field = Arc::new(fetcher(key.clone()).await);
        if !keep(&field) {
            debug!(key = %key, points = field.points.len(), "Fetched field refused, not cached");
            counter!("wind_cache_bypass_total").increment(1);
            return CachedField {
                field,
                status: CacheStatus::Bypass,
                key,
                expires_at: Utc::now(),
            };
        }

        let expires_at = self.set(&key, field.clone()).await;
        debug!(key = %key, points = field.points.len(), "Wind cache miss, stored fresh field");

        CachedField {
            field,
            status: CacheStatus::Miss,
            key,
            expires_at,
        }
    }

    /// Drop every entry, returning how many were removed.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let cleared = entries.len();
        entries.clear();
        info!(cleared = cleared, "Wind cache cleared");
        cleared
    }

    /// Number of stored entries, including any not yet purged after expiry.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn snap_grid_deg(&self) -> f64 {
        self.snap_grid_deg
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            hits,
            misses,
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
            hit_rate: if total == 0 {
                0.0
            } else {
                (hits as f64 / total as f64) * 100.0
            },
        }
    }
}
