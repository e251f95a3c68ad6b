use crate::constants::cache::DEFAULT_PREFIX;
use crate::errors::ToolError;
use crate::managers::{arg_bool, arg_string, arg_value};
use crate::services::cache::{CacheKey, CacheService, DeleteParams, SaveParams};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::stores::WILDCARD;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;
use std::sync::Arc;

const CACHE_ACTIONS: &[&str] = &["save", "get", "delete", "invalidate_session", "stats"];

#[derive(Clone)]
pub struct CacheManager {
    logger: Logger,
    cache_service: Arc<CacheService>,
}

fn key_from_args(args: &Value) -> Result<CacheKey, ToolError> {
    let resource_id = arg_string(args, "resource_id")
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ToolError::invalid_params("resource_id is required"))?;
    // May be empty (`doc-7-`) but must be passed.
    let suffix = arg_string(args, "suffix")
        .ok_or_else(|| ToolError::invalid_params("suffix is required"))?;
    let prefix = arg_string(args, "prefix").unwrap_or_else(|| DEFAULT_PREFIX.to_string());
    Ok(CacheKey::new(resource_id, suffix).with_prefix(prefix))
}

impl CacheManager {
    pub fn new(logger: Logger, cache_service: Arc<CacheService>) -> Self {
        Self {
            logger: logger.child("cache"),
            cache_service,
        }
    }

    pub fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "save" => {
                let key = key_from_args(&args)?;
                let name = key.name();
                self.cache_service.save(SaveParams {
                    key,
                    data: arg_value(&args, "data"),
                    is_extend_enabled: arg_bool(&args, "is_extend_enabled", false),
                })?;
                Ok(serde_json::json!({"success": true, "name": name}))
            }
            "get" => {
                let key = key_from_args(&args)?;
                Ok(self.cache_service.get(&key)?.unwrap_or(Value::Null))
            }
            "delete" => {
                self.cache_service.delete(DeleteParams {
                    resource_id: arg_string(&args, "resource_id"),
                    prefix: arg_string(&args, "prefix").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
                    suffix: arg_string(&args, "suffix").unwrap_or_else(|| WILDCARD.to_string()),
                })?;
                Ok(serde_json::json!({"success": true}))
            }
            "invalidate_session" => {
                let dropped = self.cache_service.quick().len();
                self.cache_service.quick().invalidate();
                Ok(serde_json::json!({"success": true, "dropped": dropped}))
            }
            "stats" => Ok(self.cache_service.stats()),
            _ => Err(unknown_action_error("cache", action, CACHE_ACTIONS)),
        }
    }
}

impl ToolHandler for CacheManager {
    fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{QuickStorage, StableStorage};
    use serde_json::json;

    #[test]
    fn numeric_resource_ids_are_accepted() {
        let dir = std::env::temp_dir().join(format!("ddtools-cache-mgr-{}", uuid::Uuid::new_v4()));
        let logger = Logger::new("test");
        let service = CacheService::with_storages(
            logger.clone(),
            QuickStorage::new(),
            StableStorage::with_dir(logger.clone(), dir.clone()),
        );
        let manager = CacheManager::new(logger, Arc::new(service));
        let saved = manager
            .handle_action(json!({"action": "save", "resource_id": 7, "suffix": "x", "data": "v"}))
            .unwrap();
        assert_eq!(saved["name"], "doc-7-x");
        let got = manager
            .handle_action(json!({"action": "get", "resource_id": "7", "suffix": "x"}))
            .unwrap();
        assert_eq!(got, json!("v"));
        let err = manager
            .handle_action(json!({"action": "get", "suffix": "x"}))
            .unwrap_err();
        assert_eq!(err.message, "resource_id is required");
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn empty_suffix_builds_trailing_dash_name() {
        let dir = std::env::temp_dir().join(format!("ddtools-cache-mgr-{}", uuid::Uuid::new_v4()));
        let logger = Logger::new("test");
        let service = CacheService::with_storages(
            logger.clone(),
            QuickStorage::new(),
            StableStorage::with_dir(logger.clone(), dir.clone()),
        );
        let manager = CacheManager::new(logger, Arc::new(service));
        let saved = manager
            .handle_action(json!({"action": "save", "resource_id": 7, "suffix": "", "data": [1]}))
            .unwrap();
        assert_eq!(saved["name"], "doc-7-");
        assert!(dir.join("doc-7-.php").exists());
        let got = manager
            .handle_action(json!({"action": "get", "resource_id": 7, "suffix": ""}))
            .unwrap();
        assert_eq!(got, json!([1]));
        let err = manager
            .handle_action(json!({"action": "get", "resource_id": 7}))
            .unwrap_err();
        assert_eq!(err.message, "suffix is required");
        let _ = std::fs::remove_dir_all(dir);
    }
}
