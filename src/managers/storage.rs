use crate::errors::ToolError;
use crate::managers::{arg_bool, arg_string, arg_usize, arg_value};
use crate::services::db_table::TableParams;
use crate::services::logger::Logger;
use crate::services::registry::Registry;
use crate::services::storage::{
    ItemsAddParams, ItemsDeleteParams, ItemsGetOneParams, ItemsGetParams, ItemsUpdateOneParams,
    ItemsUpdateParams, Storage,
};
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::{required_str, unknown_action_error};
use serde_json::Value;
use std::sync::Arc;

const STORAGE_ACTIONS: &[&str] = &[
    "items_add",
    "items_add_one",
    "items_update",
    "items_update_one",
    "items_delete",
    "items_delete_one",
    "items_get",
    "items_get_one",
];

const DEFAULT_STORAGE: &str = "db";

pub type StorageRegistry = Registry<TableParams, Box<dyn Storage>>;

/// Item CRUD against a named storage backend (`db` by default).
#[derive(Clone)]
pub struct StorageManager {
    logger: Logger,
    registry: Arc<StorageRegistry>,
}

fn props_to_return(args: &Value) -> Value {
    args.get("props_to_return")
        .cloned()
        .unwrap_or_else(|| Value::String("*".to_string()))
}

impl StorageManager {
    pub fn new(logger: Logger, registry: Arc<StorageRegistry>) -> Self {
        Self {
            logger: logger.child("storage"),
            registry,
        }
    }

    fn open(&self, args: &Value) -> Result<Box<dyn Storage>, ToolError> {
        let kind = arg_string(args, "storage").unwrap_or_else(|| DEFAULT_STORAGE.to_string());
        let columns = match arg_value(args, "columns") {
            Value::Array(columns) => columns,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        let params = TableParams {
            name_alias: required_str(args, "table")?.trim().to_string(),
            columns,
        };
        self.registry.create_child_instance(&kind, params, true)
    }

    pub fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        let action_name = action.and_then(|v| v.as_str()).unwrap_or("");
        if !STORAGE_ACTIONS.contains(&action_name) {
            return Err(unknown_action_error("storage", action, STORAGE_ACTIONS));
        }
        let storage = self.open(&args)?;
        let where_clause = arg_value(&args, "where");
        let order_by = arg_string(&args, "order_by").unwrap_or_default();
        let limit = arg_usize(&args, "limit");
        let offset = arg_usize(&args, "offset");

        match action_name {
            "items_add" => Ok(Value::Array(storage.items_add(ItemsAddParams {
                items: arg_value(&args, "items"),
            })?)),
            "items_add_one" => Ok(storage
                .items_add_one(arg_value(&args, "data"))?
                .unwrap_or(Value::Null)),
            "items_update" => Ok(Value::Array(storage.items_update(ItemsUpdateParams {
                where_clause,
                data: arg_value(&args, "data"),
                limit,
                offset,
            })?)),
            "items_update_one" => Ok(storage
                .items_update_one(ItemsUpdateOneParams {
                    where_clause,
                    data: arg_value(&args, "data"),
                    is_enabled_add_not_found: arg_bool(&args, "is_enabled_add_not_found", false),
                })?
                .unwrap_or(Value::Null)),
            "items_delete" | "items_delete_one" => {
                let params = ItemsDeleteParams {
                    where_clause,
                    order_by,
                    limit,
                    offset,
                };
                if action_name == "items_delete_one" {
                    storage.items_delete_one(params)?;
                } else {
                    storage.items_delete(params)?;
                }
                Ok(serde_json::json!({"success": true}))
            }
            "items_get" => storage.items_get(ItemsGetParams {
                where_clause,
                order_by,
                props_to_return: props_to_return(&args),
                limit,
                offset,
                prop_as_result_key: arg_string(&args, "prop_as_result_key"),
                prop_as_result_value: arg_string(&args, "prop_as_result_value"),
            }),
            _ => storage.items_get_one(ItemsGetOneParams {
                where_clause,
                order_by,
                props_to_return: props_to_return(&args),
                not_found_result: arg_value(&args, "not_found_result"),
            }),
        }
    }
}

impl ToolHandler for StorageManager {
    fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args)
    }
}
