pub mod quick_store;
pub mod stable_store;

use crate::errors::ToolError;
use regex::Regex;
use serde_json::Value;

pub use quick_store::QuickStorage;
pub use stable_store::StableStorage;

pub const WILDCARD: &str = "*";

/// A cache name with its parts. Any part may be `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNameData {
    pub name: String,
    pub prefix: String,
    pub resource_id: String,
    pub suffix: String,
}

impl CacheNameData {
    pub fn new(prefix: &str, resource_id: &str, suffix: &str) -> Self {
        Self {
            name: format!("{}-{}-{}", prefix, resource_id, suffix),
            prefix: prefix.to_string(),
            resource_id: resource_id.to_string(),
            suffix: suffix.to_string(),
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.name.contains(WILDCARD)
    }

    /// Glob over the whole joined name; each `*` matches any run of characters.
    pub fn name_pattern(&self) -> Result<Regex, ToolError> {
        let body = self
            .name
            .split(WILDCARD)
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        Regex::new(&format!("^{}$", body))
            .map_err(|err| ToolError::internal(format!("Invalid cache name pattern: {}", err)))
    }
}

pub trait CacheStorage {
    fn save(&self, name: &str, data: &Value) -> Result<(), ToolError>;

    /// `None` means the entry does not exist.
    fn get(&self, name: &str) -> Result<Option<Value>, ToolError>;

    /// `None` clears the whole tier; otherwise removes the exact name or, for
    /// wildcard patterns, every matching entry.
    fn delete(&self, target: Option<&CacheNameData>) -> Result<(), ToolError>;
}
