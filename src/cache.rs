//! Time-to-live result cache.
//!
//! Engine results are cached behind the [`ResultCache`] trait so a shared
//! cache can replace the in-process map. Expiry is lazy: stale entries are
//! dropped when looked up, never swept.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::{ClimaScoreResult, ComparisonResult, Period};

// ---

/// Default lifetime of a cached result.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Anything the engine caches.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Single(ClimaScoreResult),
    Comparison(ComparisonResult),
}

pub trait ResultCache: Send + Sync {
    // ---
    fn get(&self, key: &str) -> Option<CachedValue>;

    fn set_with_ttl(&self, key: &str, value: CachedValue, ttl: Duration);

    /// TTL applied by [`ResultCache::set`].
    fn ttl(&self) -> Duration {
        DEFAULT_TTL
    }

    fn set(&self, key: &str, value: CachedValue) {
        self.set_with_ttl(key, value, self.ttl());
    }
}

/// Cache key for a single-source score. Coordinates are rounded to four
/// decimals so sub-meter differences share an entry.
pub fn single_key(source: Option<&str>, lat: f64, lon: f64, crop: &str) -> String {
    format!("single:{}:{:.4},{:.4}:{}", source.unwrap_or("default"), lat, lon, crop)
}

/// Cache key for a comparison over `period`.
pub fn compare_key(lat: f64, lon: f64, crop: &str, period: &Period) -> String {
    format!(
        "compare:{:.4},{:.4}:{}:{}-{}",
        lat, lon, crop, period.start, period.end
    )
}

struct CacheEntry {
    value: CachedValue,
    expires_at: Instant,
}

/// Mutex-guarded in-memory cache.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl MemoryCache {
    // ---
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Entries currently held, including expired ones not yet looked up.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResultCache for MemoryCache {
    // ---
    fn get(&self, key: &str) -> Option<CachedValue> {
        // ---
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set_with_ttl(&self, key: &str, value: CachedValue, ttl: Duration) {
        // ---
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
