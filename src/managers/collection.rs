use crate::errors::ToolError;
use crate::managers::{arg_string, arg_usize, arg_value};
use crate::services::collection::{
    AddItemsParams, ConvertItemsParams, DeleteItemsParams, GetItemsParams, ObjectCollection,
    UpdateItemsParams,
};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::utils::convert::ConvertType;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

const COLLECTION_ACTIONS: &[&str] = &[
    "get_items",
    "get_one_item",
    "update_items",
    "delete_items",
    "convert_items_type",
    "count",
];

/// Runs collection operations over the `items` passed with each call.
#[derive(Clone)]
pub struct CollectionManager {
    logger: Logger,
}

fn parse_item_type(args: &Value, key: &str) -> Result<Option<ConvertType>, ToolError> {
    arg_string(args, key)
        .map(|raw| raw.parse::<ConvertType>().map_err(ToolError::invalid_params))
        .transpose()
}

impl CollectionManager {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.child("collection"),
        }
    }

    fn load(&self, args: &Value) -> Result<ObjectCollection, ToolError> {
        Ok(ObjectCollection::new(AddItemsParams {
            items: arg_value(args, "items"),
            item_type: parse_item_type(args, "item_type")?,
        }))
    }

    pub fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        let filter = arg_string(&args, "filter").unwrap_or_default();
        let limit = arg_usize(&args, "limit");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "get_items" => Ok(self.load(&args)?.get_items(&GetItemsParams {
                filter,
                limit,
                prop_as_result_key: arg_string(&args, "prop_as_result_key"),
                prop_as_result_value: arg_string(&args, "prop_as_result_value"),
            })),
            "get_one_item" => Ok(self
                .load(&args)?
                .get_one_item(&filter, args.get("not_found_result").cloned())),
            "update_items" => {
                let mut collection = self.load(&args)?;
                let affected = collection.update_items(UpdateItemsParams {
                    filter,
                    data: arg_value(&args, "data"),
                    limit,
                });
                Ok(serde_json::json!({"affected": affected, "items": collection.to_array()}))
            }
            "delete_items" => {
                let mut collection = self.load(&args)?;
                let affected = collection.delete_items(DeleteItemsParams { filter, limit });
                Ok(serde_json::json!({"affected": affected, "items": collection.to_array()}))
            }
            "convert_items_type" => {
                let mut collection = self.load(&args)?;
                let item_type = parse_item_type(&args, "type")?.unwrap_or(ConvertType::ObjectStdClass);
                collection.convert_items_type(ConvertItemsParams { filter, item_type });
                Ok(collection.to_array())
            }
            "count" => Ok(Value::from(self.load(&args)?.count())),
            _ => Err(unknown_action_error("collection", action, COLLECTION_ACTIONS)),
        }
    }
}

impl ToolHandler for CollectionManager {
    fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args)
    }
}
