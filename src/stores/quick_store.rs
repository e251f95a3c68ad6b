use crate::errors::ToolError;
use crate::stores::{CacheNameData, CacheStorage};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};

/// Per-session in-memory tier. Clones share the same session map.
#[derive(Clone, Default)]
pub struct QuickStorage {
    entries: Arc<RwLock<Map<String, Value>>>,
}

impl QuickStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops everything, as when the session ends.
    pub fn invalidate(&self) {
        self.entries
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

impl CacheStorage for QuickStorage {
    fn save(&self, name: &str, data: &Value) -> Result<(), ToolError> {
        self.entries
            .write()
            .unwrap_or_else(|err| err.into_inner())
            .insert(name.to_string(), data.clone());
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Value>, ToolError> {
        let guard = self.entries.read().unwrap_or_else(|err| err.into_inner());
        Ok(guard.get(name).filter(|value| !value.is_null()).cloned())
    }

    fn delete(&self, target: Option<&CacheNameData>) -> Result<(), ToolError> {
        let mut guard = self.entries.write().unwrap_or_else(|err| err.into_inner());
        match target {
            None => *guard = Map::new(),
            Some(pattern) if !pattern.has_wildcard() => {
                guard.retain(|name, _| *name != pattern.name);
            }
            Some(pattern) => {
                let matcher = pattern.name_pattern()?;
                guard.retain(|name, _| !matcher.is_match(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_entries() {
        let quick = QuickStorage::new();
        let other = quick.clone();
        quick.save("doc-1-a", &json!({"a": 1})).unwrap();
        assert_eq!(other.get("doc-1-a").unwrap(), Some(json!({"a": 1})));
        other.invalidate();
        assert!(quick.is_empty());
    }

    #[test]
    fn exact_and_pattern_delete() {
        let quick = QuickStorage::new();
        for name in ["doc-1-a", "doc-1-b", "doc-2-a"] {
            quick.save(name, &json!(name)).unwrap();
        }
        quick
            .delete(Some(&CacheNameData::new("doc", "1", "a")))
            .unwrap();
        assert_eq!(quick.names(), vec!["doc-1-b", "doc-2-a"]);
        quick
            .delete(Some(&CacheNameData::new("*", "2", "*")))
            .unwrap();
        assert_eq!(quick.names(), vec!["doc-1-b"]);
        quick.save("my-doc-3-a", &json!(1)).unwrap();
        quick
            .delete(Some(&CacheNameData::new("my-doc", "*", "*")))
            .unwrap();
        assert_eq!(quick.names(), vec!["doc-1-b"]);
        quick.delete(None).unwrap();
        assert!(quick.is_empty());
    }
}
