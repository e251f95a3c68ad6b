use crate::constants::cache::DEFAULT_PREFIX;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::stores::{CacheNameData, CacheStorage, QuickStorage, StableStorage, WILDCARD};
use crate::utils::merge::{extend, is_container, ExtendOptions};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// `(prefix, resource_id, suffix)`, stored as `prefix-resource_id-suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub prefix: String,
    pub resource_id: String,
    pub suffix: String,
}

impl CacheKey {
    pub fn new(resource_id: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            resource_id: resource_id.into(),
            suffix: suffix.into(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn name_data(&self) -> CacheNameData {
        CacheNameData::new(&self.prefix, &self.resource_id, &self.suffix)
    }

    pub fn name(&self) -> String {
        self.name_data().name
    }
}

#[derive(Debug, Clone)]
pub struct SaveParams {
    pub key: CacheKey,
    pub data: Value,
    /// Merge into the existing entry instead of replacing it.
    pub is_extend_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct DeleteParams {
    /// `None` or empty clears every entry regardless of prefix and suffix.
    pub resource_id: Option<String>,
    pub prefix: String,
    pub suffix: String,
}

impl Default for DeleteParams {
    fn default() -> Self {
        Self {
            resource_id: None,
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: WILDCARD.to_string(),
        }
    }
}

#[derive(Default)]
struct CacheStats {
    quick_hits: u64,
    stable_hits: u64,
    misses: u64,
    writes: u64,
}

/// Two-tier cache: the per-session quick tier in front of the file tier.
///
/// Reads go quick → stable and repopulate the quick tier on a stable hit.
/// Writes and deletes hit both tiers; nothing coordinates the two.
#[derive(Clone)]
pub struct CacheService {
    logger: Logger,
    quick: QuickStorage,
    stable: StableStorage,
    stats: Arc<Mutex<CacheStats>>,
}

impl CacheService {
    pub fn new(logger: Logger, quick: QuickStorage) -> Self {
        let stable = StableStorage::new(logger.clone());
        Self::with_storages(logger, quick, stable)
    }

    pub fn with_storages(logger: Logger, quick: QuickStorage, stable: StableStorage) -> Self {
        Self {
            logger: logger.child("cache"),
            quick,
            stable,
            stats: Arc::new(Mutex::new(CacheStats::default())),
        }
    }

    pub fn quick(&self) -> &QuickStorage {
        &self.quick
    }

    pub fn stable(&self) -> &StableStorage {
        &self.stable
    }

    pub fn save(&self, params: SaveParams) -> Result<(), ToolError> {
        let name = params.key.name();
        let data = if params.is_extend_enabled && is_container(&params.data) {
            match self.get(&params.key)? {
                Some(existing) if is_container(&existing) => {
                    extend(&[existing, params.data], &ExtendOptions::default())
                }
                _ => params.data,
            }
        } else {
            params.data
        };

        self.quick.save(&name, &data)?;
        self.stable.save(&name, &data)?;
        self.bump(|stats| stats.writes += 1);
        self.logger
            .debug("saved", Some(&serde_json::json!({"name": name})));
        Ok(())
    }

    pub fn get(&self, key: &CacheKey) -> Result<Option<Value>, ToolError> {
        let name = key.name();
        if let Some(hit) = self.quick.get(&name)? {
            self.bump(|stats| stats.quick_hits += 1);
            return Ok(Some(hit));
        }

        let Some(hit) = self.stable.get(&name)? else {
            self.bump(|stats| stats.misses += 1);
            return Ok(None);
        };
        self.quick.save(&name, &hit)?;
        self.bump(|stats| stats.stable_hits += 1);
        self.logger
            .debug("quick tier repopulated", Some(&serde_json::json!({"name": name})));
        Ok(Some(hit))
    }

    pub fn delete(&self, params: DeleteParams) -> Result<(), ToolError> {
        let resource_id = params
            .resource_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != "0");

        let Some(resource_id) = resource_id else {
            self.quick.delete(None)?;
            self.stable.delete(None)?;
            self.logger.debug("cleared", None);
            return Ok(());
        };

        let target = CacheNameData::new(&params.prefix, resource_id, &params.suffix);
        self.quick.delete(Some(&target))?;
        self.stable.delete(Some(&target))?;
        self.logger
            .debug("deleted", Some(&serde_json::json!({"name": target.name})));
        Ok(())
    }

    pub fn stats(&self) -> Value {
        let stats = self.stats.lock().unwrap_or_else(|err| err.into_inner());
        serde_json::json!({
            "quick_hits": stats.quick_hits,
            "stable_hits": stats.stable_hits,
            "misses": stats.misses,
            "writes": stats.writes,
            "quick_entries": self.quick.len(),
        })
    }

    fn bump(&self, update: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> (CacheService, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("ddtools-cache-{}", uuid::Uuid::new_v4()));
        let logger = Logger::new("test");
        let stable = StableStorage::with_dir(logger.clone(), dir.clone());
        (
            CacheService::with_storages(logger, QuickStorage::new(), stable),
            dir,
        )
    }

    #[test]
    fn extend_enabled_merges_existing_entry() {
        let (cache, dir) = service();
        let key = CacheKey::new("3", "meta");
        cache
            .save(SaveParams {
                key: key.clone(),
                data: json!({"a": 1, "nested": {"x": 1}}),
                is_extend_enabled: false,
            })
            .unwrap();
        cache
            .save(SaveParams {
                key: key.clone(),
                data: json!({"nested": {"y": 2}}),
                is_extend_enabled: true,
            })
            .unwrap();
        let expected = json!({"a": 1, "nested": {"x": 1, "y": 2}});
        assert_eq!(cache.get(&key).unwrap(), Some(expected.clone()));
        cache.quick().invalidate();
        assert_eq!(cache.get(&key).unwrap(), Some(expected));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn miss_returns_none() {
        let (cache, _dir) = service();
        assert_eq!(cache.get(&CacheKey::new("1", "none")).unwrap(), None);
        assert_eq!(cache.stats()["misses"], 1);
    }
}
