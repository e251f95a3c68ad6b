use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::utils::arg_aliases::normalize_args_aliases;
use crate::utils::text::truncate_utf8_prefix;
use crate::utils::tool_errors::unknown_tool_error;

use serde_json::Value;

pub trait ToolHandler: Send + Sync {
    fn handle(&self, args: Value) -> Result<Value, ToolError>;
}

/// Routes a tool call to its handler after normalising argument aliases.
#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let tool = tool.trim();
        let Some(handler) = self.handlers.get(tool) else {
            return Err(unknown_tool_error(tool, &self.tool_names()));
        };

        let args = match args {
            Value::Null => Value::Object(serde_json::Map::new()),
            Value::Object(_) => args,
            _ => {
                return Err(ToolError::invalid_params("Tool arguments must be a JSON object")
                    .with_hint("Pass arguments as {\"action\": ..., ...}."))
            }
        };
        let (args, normalization) = normalize_args_aliases(&args, tool);
        if let Some(report) = normalization.as_ref() {
            self.logger.debug(
                "normalized arguments",
                Some(&serde_json::json!({"tool": tool, "report": report})),
            );
        }

        let action = args
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let result = handler.handle(args);
        match &result {
            Ok(_) => self.logger.debug(
                "tool call finished",
                Some(&serde_json::json!({"tool": tool, "action": action})),
            ),
            Err(err) => self.logger.warn(
                "tool call failed",
                Some(&serde_json::json!({
                    "tool": tool,
                    "action": action,
                    "code": err.code,
                    "message": truncate_utf8_prefix(&err.message, 240),
                })),
            ),
        }
        result
    }
}
