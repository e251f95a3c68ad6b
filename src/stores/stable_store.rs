use crate::constants::cache::{
    CONTENT_PREFIX, FILE_EXTENSION, FILE_MODE, TAG_ARRAY, TAG_LEN, TAG_OBJECT, TAG_STRING,
};
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::stores::{CacheNameData, CacheStorage};
use crate::utils::convert::{convert_type, scalar_to_string, to_json_string, ConvertType};
use crate::utils::fs_atomic::{atomic_write_text_file, remove_dir_if_exists};
use crate::utils::paths::resolve_cache_dir;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File-backed tier: one `{name}.php` file per entry.
#[derive(Clone)]
pub struct StableStorage {
    logger: Logger,
    target_dir: PathBuf,
}

impl StableStorage {
    pub fn new(logger: Logger) -> Self {
        Self::with_dir(logger, resolve_cache_dir())
    }

    pub fn with_dir(logger: Logger, target_dir: PathBuf) -> Self {
        Self {
            logger: logger.child("stable"),
            target_dir,
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.target_dir.join(format!("{}.{}", name, FILE_EXTENSION))
    }

    fn stored_names(&self) -> Vec<(String, PathBuf)> {
        walkdir::WalkDir::new(&self.target_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.into_path();
                let is_cache_file = path.extension().and_then(|ext| ext.to_str()) == Some(FILE_EXTENSION);
                let stem = path.file_stem().and_then(|s| s.to_str())?.to_string();
                is_cache_file.then_some((stem, path))
            })
            .collect()
    }
}

/// Guard header, then a 3-char type tag, then the payload.
pub fn encode_entry(data: &Value) -> String {
    let (tag, payload) = match data {
        Value::Object(_) => (TAG_OBJECT, to_json_string(data)),
        Value::Array(_) => (TAG_ARRAY, to_json_string(data)),
        other => (TAG_STRING, scalar_to_string(other)),
    };
    format!("{}{}{}", CONTENT_PREFIX, tag, payload)
}

pub fn decode_entry(raw: &str) -> Option<Value> {
    let body = raw.strip_prefix(CONTENT_PREFIX)?;
    if body.len() < TAG_LEN || !body.is_char_boundary(TAG_LEN) {
        return None;
    }
    let (tag, payload) = body.split_at(TAG_LEN);
    let payload = Value::String(payload.to_string());
    match tag {
        TAG_OBJECT => Some(convert_type(&payload, ConvertType::ObjectStdClass)),
        TAG_ARRAY => Some(convert_type(&payload, ConvertType::ObjectArray)),
        _ => Some(payload),
    }
}

impl CacheStorage for StableStorage {
    fn save(&self, name: &str, data: &Value) -> Result<(), ToolError> {
        atomic_write_text_file(self.entry_path(name), &encode_entry(data), FILE_MODE)
            .map_err(|err| ToolError::internal(format!("Failed to write cache file: {}", err)))
    }

    fn get(&self, name: &str) -> Result<Option<Value>, ToolError> {
        let path = self.entry_path(name);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    self.logger.warn(
                        "Cache read failed",
                        Some(&serde_json::json!({"name": name, "error": err.to_string()})),
                    );
                }
                return Ok(None);
            }
        };
        let decoded = decode_entry(&raw);
        if decoded.is_none() {
            self.logger.warn(
                "Cache file has no guard header",
                Some(&serde_json::json!({"path": path.display().to_string()})),
            );
        }
        Ok(decoded)
    }

    fn delete(&self, target: Option<&CacheNameData>) -> Result<(), ToolError> {
        let Some(pattern) = target else {
            return remove_dir_if_exists(&self.target_dir)
                .map_err(|err| ToolError::internal(format!("Failed to clear cache dir: {}", err)));
        };

        if !pattern.has_wildcard() {
            return match std::fs::remove_file(self.entry_path(&pattern.name)) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(ToolError::internal(
                    format!("Failed to remove cache file: {}", err),
                )),
                _ => Ok(()),
            };
        }

        let matcher = pattern.name_pattern()?;
        for (name, path) in self.stored_names() {
            if matcher.is_match(&name) {
                if let Err(err) = std::fs::remove_file(&path) {
                    self.logger.warn(
                        "Cache file removal failed",
                        Some(&serde_json::json!({"name": name, "error": err.to_string()})),
                    );
                }
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
    fn encodes_with_guard_and_tag() {
        assert_eq!(
            encode_entry(&json!({"a": "x/y"})),
            "<?php die(\"Unauthorized access.\"); ?>obj{\"a\":\"x/y\"}"
        );
        assert_eq!(
            encode_entry(&json!("plain")),
            "<?php die(\"Unauthorized access.\"); ?>strplain"
        );
        assert_eq!(
            encode_entry(&json!([1])),
            "<?php die(\"Unauthorized access.\"); ?>arr[1]"
        );
    }

    #[test]
    fn decodes_each_tag() {
        assert_eq!(decode_entry(&encode_entry(&json!({"a": 1}))), Some(json!({"a": 1})));
        assert_eq!(decode_entry(&encode_entry(&json!([1, 2]))), Some(json!([1, 2])));
        assert_eq!(decode_entry(&encode_entry(&json!(42))), Some(json!("42")));
        assert_eq!(decode_entry("no header"), None);
    }

    #[test]
    fn empty_object_decodes_as_mapping() {
        assert_eq!(decode_entry(&encode_entry(&json!({}))), Some(json!({})));
    }
}
