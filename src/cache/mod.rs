//! Signature-keyed icon cache
//!
//! One slot, one fixed key. An entry is served only when its stored
//! signature matches the queried one and it has not outlived the
//! configured TTL; any invalid entry is cleared on sight. A missing
//! storage backend degrades reads to misses and writes to no-ops, and a
//! quota failure on write clears the slot and drops the entry. Nothing
//! in here propagates an error to the caller.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::FaviconConfig;
use crate::errors::StoreError;
use crate::models::IconArtifact;
use crate::store::KeyValueStore;

/// Fixed key of the single cache slot.
pub const CACHE_KEY: &str = "auto-favicon-cache";

/// Persisted schema version.
const ENTRY_VERSION: &str = "1.0.0";

/// The persisted slot contents.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    signature: String,
    data_url: String,
    /// Unix milliseconds at store time
    timestamp: i64,
    version: String,
}

/// Diagnostic snapshot of the cache slot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheInfo {
    pub available: bool,
    pub cached: bool,
    pub signature: Option<String>,
    pub current_signature: Option<String>,
    pub timestamp: Option<i64>,
    pub age_minutes: Option<i64>,
    pub max_age_minutes: Option<i64>,
    pub expired: Option<bool>,
    pub signature_match: Option<bool>,
}

/// Single-slot artifact cache over a key-value backend.
#[derive(Clone)]
pub struct FaviconCache {
    store: Option<Arc<dyn KeyValueStore>>,
}

impl FaviconCache {
    pub fn new(store: Option<Arc<dyn KeyValueStore>>) -> Self {
        Self { store }
    }

    /// Cache with no backend: every read misses, every write is a no-op.
    pub fn disabled() -> Self {
        Self { store: None }
    }

    fn max_age_ms(config: &FaviconConfig) -> i64 {
        config.cache_expiration_days * 24 * 60 * 60 * 1000
    }

    fn read_entry(&self) -> Option<CacheEntry> {
        let store = self.store.as_ref()?;
        let raw = store.get_item(CACHE_KEY)?;
        match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) if !entry.signature.is_empty() && !entry.data_url.is_empty() => Some(entry),
            Ok(_) => {
                warn!("Structurally invalid cache entry, clearing");
                self.clear();
                None
            }
            Err(e) => {
                warn!("Corrupt cache entry, clearing: {}", e);
                self.clear();
                None
            }
        }
    }

    /// Retrieve the cached artifact for `signature`, clearing the slot
    /// when it holds anything stale, mismatched or malformed.
    pub fn get(&self, signature: &str, config: &FaviconConfig) -> Option<IconArtifact> {
        let entry = self.read_entry()?;

        let age = Utc::now().timestamp_millis() - entry.timestamp;
        if age > Self::max_age_ms(config) {
            debug!("Cache entry expired ({} ms old), clearing", age);
            self.clear();
            return None;
        }

        if entry.signature != signature {
            debug!("Page signature changed, clearing cache");
            self.clear();
            return None;
        }

        match IconArtifact::from_data_url(&entry.data_url, config.size) {
            Some(artifact) => {
                debug!("Cache hit for signature {}", signature);
                Some(artifact)
            }
            None => {
                warn!("Cached payload is not a PNG data URI, clearing");
                self.clear();
                None
            }
        }
    }

    /// Store an artifact under `signature`, overwriting the slot.
    pub fn put(&self, signature: &str, artifact: &IconArtifact) {
        let Some(store) = self.store.as_ref() else {
            debug!("No storage backend, skipping cache write");
            return;
        };

        let entry = CacheEntry {
            signature: signature.to_string(),
            data_url: artifact.as_data_url().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            version: ENTRY_VERSION.to_string(),
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize cache entry: {}", e);
                return;
            }
        };

        match store.set_item(CACHE_KEY, &json) {
            Ok(()) => debug!("Favicon cached under signature {}", signature),
            Err(StoreError::QuotaExceeded) => {
                warn!("Storage quota exceeded, clearing cache slot");
                self.clear();
            }
            Err(e) => warn!("Cache write failed: {}", e),
        }
    }

    /// Drop the slot contents.
    pub fn clear(&self) {
        if let Some(store) = self.store.as_ref() {
            store.remove_item(CACHE_KEY);
        }
    }

    /// Diagnostic view of the slot against the current signature.
    pub fn info(&self, current_signature: Option<&str>, config: &FaviconConfig) -> CacheInfo {
        let Some(store) = self.store.as_ref() else {
            return CacheInfo::default();
        };

        let mut info = CacheInfo {
            available: true,
            current_signature: current_signature.map(str::to_string),
            ..Default::default()
        };

        let Some(raw) = store.get_item(CACHE_KEY) else {
            return info;
        };
        let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) else {
            return info;
        };

        let age = Utc::now().timestamp_millis() - entry.timestamp;
        let max_age = Self::max_age_ms(config);
        info.cached = true;
        info.timestamp = Some(entry.timestamp);
        info.age_minutes = Some(age / 60_000);
        info.max_age_minutes = Some(max_age / 60_000);
        info.expired = Some(age > max_age);
        info.signature_match = current_signature.map(|sig| sig == entry.signature);
        info.signature = Some(entry.signature);
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cache_with_memory() -> (FaviconCache, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (FaviconCache::new(Some(store.clone())), store)
    }

    fn artifact() -> IconArtifact {
        IconArtifact::from_png_bytes(&[0x89, 0x50, 0x4e, 0x47], 32)
    }

    #[test]
    fn test_put_then_get_round_trip() {
        let (cache, _store) = cache_with_memory();
        let config = FaviconConfig::default();
        cache.put("sig-1", &artifact());
        assert_eq!(cache.get("sig-1", &config), Some(artifact()));
    }

    #[test]
    fn test_signature_mismatch_clears_entry() {
        let (cache, store) = cache_with_memory();
        let config = FaviconConfig::default();
        cache.put("sig-1", &artifact());

        assert_eq!(cache.get("sig-2", &config), None);
        // Side effect: the now-invalid slot is gone entirely.
        assert_eq!(store.get_item(CACHE_KEY), None);
        assert_eq!(cache.get("sig-1", &config), None);
    }

    #[test]
    fn test_expired_entry_clears() {
        let (cache, store) = cache_with_memory();
        let config = FaviconConfig::default();

        let stale = CacheEntry {
            signature: "sig-1".to_string(),
            data_url: artifact().as_data_url().to_string(),
            timestamp: Utc::now().timestamp_millis()
                - (config.cache_expiration_days * 24 * 60 * 60 * 1000 + 1),
            version: ENTRY_VERSION.to_string(),
        };
        store
            .set_item(CACHE_KEY, &serde_json::to_string(&stale).unwrap())
            .unwrap();

        assert_eq!(cache.get("sig-1", &config), None);
        assert_eq!(store.get_item(CACHE_KEY), None);
    }

    #[test]
    fn test_corrupt_entry_is_a_miss_and_cleared() {
        let (cache, store) = cache_with_memory();
        let config = FaviconConfig::default();
        store.set_item(CACHE_KEY, "{not json").unwrap();

        assert_eq!(cache.get("sig-1", &config), None);
        assert_eq!(store.get_item(CACHE_KEY), None);
    }

    #[test]
    fn test_missing_backend_degrades_silently() {
        let cache = FaviconCache::disabled();
        let config = FaviconConfig::default();
        cache.put("sig-1", &artifact());
        assert_eq!(cache.get("sig-1", &config), None);
        assert!(!cache.info(Some("sig-1"), &config).available);
    }

    #[test]
    fn test_quota_exhaustion_clears_and_drops() {
        let store = Arc::new(MemoryStore::with_capacity_limit(4));
        let cache = FaviconCache::new(Some(store.clone()));
        let config = FaviconConfig::default();

        cache.put("sig-1", &artifact());
        // Write failed; nothing is served and nothing lingers.
        assert_eq!(cache.get("sig-1", &config), None);
        assert_eq!(store.get_item(CACHE_KEY), None);
    }

    #[test]
    fn test_info_reflects_slot_state() {
        let (cache, _store) = cache_with_memory();
        let config = FaviconConfig::default();

        let empty = cache.info(Some("sig-1"), &config);
        assert!(empty.available);
        assert!(!empty.cached);

        cache.put("sig-1", &artifact());
        let full = cache.info(Some("sig-1"), &config);
        assert!(full.cached);
        assert_eq!(full.signature.as_deref(), Some("sig-1"));
        assert_eq!(full.signature_match, Some(true));
        assert_eq!(full.expired, Some(false));

        let mismatched = cache.info(Some("sig-2"), &config);
        assert_eq!(mismatched.signature_match, Some(false));
    }
}
