//! In-memory TTL cache for wind fields.
//!
//! Requests are normalized before lookup: the bounding box is snapped outward
//! to a coarse grid and the time is rounded down to the hour, so requests for
//! nearly the same area and time share one entry.
//!
//! ## Eviction
//!
//! Entries expire lazily on read once their TTL has elapsed. When the cache is
//! full, the single entry with the oldest insertion time is dropped. This is
//! insertion-order eviction, not LRU: reading an entry does not extend its
//! life.
//!
//! ## Limitations
//!
//! The cache lives in one process. Several service instances each keep their
//! own copy and clearing one does not clear the others.

pub mod config;
pub mod field_cache;
pub mod key;

pub use config::CacheConfig;
pub use field_cache::{CacheStats, CacheStatus, CachedField, FieldCache};
pub use key::CacheKey;
