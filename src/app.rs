use crate::errors::ToolError;
use crate::managers;
use crate::managers::storage::StorageRegistry;
use crate::services::cache::CacheService;
use crate::services::db_driver::{DbDriver, SqliteDriver};
use crate::services::db_table::{DbTable, TableParams};
use crate::services::logger::Logger;
use crate::services::storage::Storage;
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::stores::{QuickStorage, StableStorage};
use crate::utils::paths::{resolve_db_path, resolve_table_prefix};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the application keeps its state.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub cache_dir: Option<PathBuf>,
    pub db_path: PathBuf,
    pub table_prefix: String,
}

impl AppPaths {
    pub fn from_env() -> Self {
        Self {
            cache_dir: None,
            db_path: resolve_db_path(),
            table_prefix: resolve_table_prefix(),
        }
    }
}

pub struct App {
    pub logger: Logger,
    pub cache_service: Arc<CacheService>,
    pub tool_executor: Arc<ToolExecutor>,
}

fn storage_registry(logger: &Logger, paths: &AppPaths) -> StorageRegistry {
    let driver: Arc<OnceCell<Arc<dyn DbDriver>>> = Arc::new(OnceCell::new());
    let db_path = paths.db_path.clone();
    let table_prefix = paths.table_prefix.clone();
    let logger = logger.clone();

    let mut registry = StorageRegistry::new("Storage");
    registry.register("Db", move |params: TableParams| {
        let driver = driver
            .get_or_try_init(|| -> Result<Arc<dyn DbDriver>, ToolError> {
                let opened = SqliteDriver::open(&db_path, table_prefix.clone())?;
                logger.debug(
                    "database opened",
                    Some(&serde_json::json!({"path": db_path.display().to_string()})),
                );
                Ok(Arc::new(opened))
            })?
            .clone();
        let table = DbTable::with_logger(logger.clone(), driver, params)?;
        Ok(Box::new(table) as Box<dyn Storage>)
    });
    registry
}

impl App {
    pub fn initialize() -> Result<Self, ToolError> {
        Self::with_paths(AppPaths::from_env(), QuickStorage::new())
    }

    /// `quick` is the session tier; pass the same handle to share it across apps.
    pub fn with_paths(paths: AppPaths, quick: QuickStorage) -> Result<Self, ToolError> {
        let logger = Logger::new("ddtools");

        let stable = match paths.cache_dir.clone() {
            Some(dir) => StableStorage::with_dir(logger.clone(), dir),
            None => StableStorage::new(logger.clone()),
        };
        let cache_service = Arc::new(CacheService::with_storages(logger.clone(), quick, stable));
        let registry = Arc::new(storage_registry(&logger, &paths));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert(
            "objects".to_string(),
            Arc::new(managers::objects::ObjectsManager::new(logger.clone())),
        );
        handlers.insert(
            "collection".to_string(),
            Arc::new(managers::collection::CollectionManager::new(logger.clone())),
        );
        handlers.insert(
            "cache".to_string(),
            Arc::new(managers::cache::CacheManager::new(
                logger.clone(),
                cache_service.clone(),
            )),
        );
        handlers.insert(
            "response".to_string(),
            Arc::new(managers::response::ResponseManager::new(logger.clone())),
        );
        handlers.insert(
            "storage".to_string(),
            Arc::new(managers::storage::StorageManager::new(logger.clone(), registry)),
        );

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        logger.debug(
            "initialized",
            Some(&serde_json::json!({"tools": tool_executor.tool_names()})),
        );

        Ok(Self {
            logger,
            cache_service,
            tool_executor,
        })
    }

    pub fn handle(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        self.tool_executor.execute(tool, args)
    }
}
