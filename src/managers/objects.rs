use crate::errors::ToolError;
use crate::managers::{arg_bool, arg_string, arg_value};
use crate::services::logger::Logger;
use crate::services::tool_executor::ToolHandler;
use crate::utils::convert::{convert_type, values_of, ConvertType};
use crate::utils::data_path::{get_prop_value, is_prop_exists, unfold, UnfoldOptions};
use crate::utils::merge::{extend, ExtendOptions};
use crate::utils::tool_errors::{required_str, unknown_action_error};
use serde_json::Value;

const OBJECTS_ACTIONS: &[&str] = &["extend", "get_prop", "is_prop_exists", "unfold", "convert"];

#[derive(Clone)]
pub struct ObjectsManager {
    logger: Logger,
}

impl ObjectsManager {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.child("objects"),
        }
    }

    pub fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "extend" => {
                let objects = match arg_value(&args, "objects") {
                    Value::Array(objects) => objects,
                    Value::Null => {
                        return Err(ToolError::invalid_params("objects is required")
                            .with_hint("Pass objects as a list, e.g. [{\"a\": 1}, {\"b\": 2}]."))
                    }
                    other => values_of(other),
                };
                let extendable_properties = match args.get("extendable_properties") {
                    Some(Value::Array(names)) => Some(
                        names
                            .iter()
                            .filter_map(|name| name.as_str().map(str::to_string))
                            .collect(),
                    ),
                    Some(Value::String(names)) => {
                        Some(names.split(',').map(|name| name.trim().to_string()).collect())
                    }
                    _ => None,
                };
                let options = ExtendOptions {
                    deep: arg_bool(&args, "deep", true),
                    overwrite_with_empty: arg_bool(&args, "overwrite_with_empty", true),
                    extendable_properties,
                };
                Ok(extend(&objects, &options))
            }
            "get_prop" => {
                let prop_name = required_str(&args, "prop_name")?;
                Ok(get_prop_value(
                    &arg_value(&args, "object"),
                    prop_name,
                    args.get("not_found_result"),
                ))
            }
            "is_prop_exists" => {
                let prop_name = required_str(&args, "prop_name")?;
                Ok(Value::Bool(is_prop_exists(&arg_value(&args, "object"), prop_name)))
            }
            "unfold" => {
                let defaults = UnfoldOptions::default();
                let options = UnfoldOptions {
                    key_separator: arg_string(&args, "key_separator")
                        .unwrap_or(defaults.key_separator),
                    key_prefix: arg_string(&args, "key_prefix").unwrap_or(defaults.key_prefix),
                    is_cross_type_enabled: arg_bool(&args, "is_cross_type_enabled", false),
                };
                Ok(unfold(&arg_value(&args, "object"), &options))
            }
            "convert" => {
                let target = match arg_string(&args, "type") {
                    Some(raw) => raw.parse::<ConvertType>().map_err(|err| {
                        ToolError::invalid_params(err).with_hint(
                            "Use objectAuto, objectStdClass, objectArray, stringQueryFormatted, \
                             stringHtmlAttrs, stringJsonAuto, stringJsonObject or stringJsonArray.",
                        )
                    })?,
                    None => ConvertType::default(),
                };
                Ok(convert_type(&arg_value(&args, "object"), target))
            }
            _ => Err(unknown_action_error("objects", action, OBJECTS_ACTIONS)),
        }
    }
}

impl ToolHandler for ObjectsManager {
    fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args)
    }
}
