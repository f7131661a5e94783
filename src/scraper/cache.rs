//! File-based cache with TTL support.
//!
//! Keys are content-addressed: the typed call arguments are hashed with
//! blake3 and the hex digest names the entry file. Each entry records its own
//! expiry, so changing the configured TTL only affects entries written later.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Cache entry with expiry
#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Cache categories, one directory each
#[derive(Debug, Clone, Copy)]
pub enum CacheCategory {
    Document,
    Games,
}

impl CacheCategory {
    /// Get directory name for this category
    pub fn dir_name(&self) -> &str {
        match self {
            CacheCategory::Document => "document",
            CacheCategory::Games => "games",
        }
    }
}

/// Hash typed key parts into a stable hex digest.
pub fn cache_key(parts: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// File-based cache
pub struct Cache {
    base_dir: PathBuf,
    ttl: Duration,
}

impl Cache {
    /// Create a new cache with the given base directory and entry lifetime
    pub fn new(base_dir: PathBuf, ttl: Duration) -> Self {
        Self { base_dir, ttl }
    }

    /// Get cache directory for a category
    fn category_dir(&self, category: CacheCategory) -> PathBuf {
        self.base_dir.join(category.dir_name())
    }

    /// Get cache file path for a key
    fn cache_path(&self, category: CacheCategory, key: &str) -> PathBuf {
        self.category_dir(category).join(format!("{}.json", key))
    }

    /// Get cached data if present and unexpired
    pub fn get<T: DeserializeOwned>(&self, category: CacheCategory, key: &str) -> Option<T> {
        let path = self.cache_path(category, key);

        let content = std::fs::read_to_string(&path).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        if Utc::now() >= entry.expires_at {
            debug!("cache entry {}/{} expired", category.dir_name(), key);
            return None;
        }

        Some(entry.data)
    }

    /// Set cache data
    ///
    /// Written to a temp file first and renamed into place so readers in
    /// other processes never observe a partial entry.
    pub fn set<T: Serialize>(&self, category: CacheCategory, key: &str, data: &T) -> Result<()> {
        let dir = self.category_dir(category);
        std::fs::create_dir_all(&dir)?;

        let cached_at = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at,
            expires_at: cached_at + chrono::Duration::from_std(self.ttl)?,
        };

        let path = self.cache_path(category, key);
        let tmp = dir.join(format!("{}.{}.tmp", key, std::process::id()));
        std::fs::write(&tmp, serde_json::to_string(&entry)?)?;
        std::fs::rename(&tmp, &path)?;

        Ok(())
    }

    /// Clear cache for a category
    pub fn clear(&self, category: CacheCategory) -> Result<()> {
        let dir = self.category_dir(category);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_stable_and_distinct() {
        assert_eq!(cache_key(&["fetch", "2024-01-06"]), cache_key(&["fetch", "2024-01-06"]));
        assert_ne!(cache_key(&["fetch", "2024-01-06"]), cache_key(&["fetch", "2024-01-07"]));
        // Part boundaries matter
        assert_ne!(cache_key(&["ab", "c"]), cache_key(&["a", "bc"]));
    }

    #[test]
    fn test_set_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_path_buf(), Duration::from_secs(60));

        cache
            .set(CacheCategory::Document, "k1", &"<html></html>".to_string())
            .unwrap();
        let hit: Option<String> = cache.get(CacheCategory::Document, "k1");
        assert_eq!(hit.as_deref(), Some("<html></html>"));

        let miss: Option<String> = cache.get(CacheCategory::Games, "k1");
        assert!(miss.is_none());
    }

    #[test]
    fn test_expired_entry_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_path_buf(), Duration::ZERO);

        cache.set(CacheCategory::Document, "k", &1u32).unwrap();
        let hit: Option<u32> = cache.get(CacheCategory::Document, "k");
        assert!(hit.is_none());
    }

    #[test]
    fn test_ttl_change_does_not_retime_entries() {
        let dir = tempfile::tempdir().unwrap();
        let short = Cache::new(dir.path().to_path_buf(), Duration::ZERO);
        short.set(CacheCategory::Games, "k", &vec![1, 2, 3]).unwrap();

        // Same directory, longer TTL: the entry keeps its original expiry
        let long = Cache::new(dir.path().to_path_buf(), Duration::from_secs(3600));
        let hit: Option<Vec<i32>> = long.get(CacheCategory::Games, "k");
        assert!(hit.is_none());

        long.set(CacheCategory::Games, "k", &vec![4]).unwrap();
        let again = Cache::new(dir.path().to_path_buf(), Duration::ZERO);
        let hit: Option<Vec<i32>> = again.get(CacheCategory::Games, "k");
        assert_eq!(hit, Some(vec![4]));
    }

    #[test]
    fn test_clear_category() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().to_path_buf(), Duration::from_secs(60));
        cache.set(CacheCategory::Games, "k", &1u8).unwrap();
        cache.clear(CacheCategory::Games).unwrap();
        assert!(cache.get::<u8>(CacheCategory::Games, "k").is_none());
    }
}
