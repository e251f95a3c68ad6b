use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::response::Response;
use crate::services::tool_executor::ToolHandler;
use crate::utils::tool_errors::unknown_action_error;
use serde_json::Value;

const RESPONSE_ACTIONS: &[&str] = &["build"];

#[derive(Clone)]
pub struct ResponseManager {
    logger: Logger,
}

impl ResponseManager {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.child("response"),
        }
    }

    pub fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        match action.and_then(|v| v.as_str()).unwrap_or("") {
            "build" => {
                let mut response = Response::new();
                let meta = args
                    .get("meta")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
                if !response.set_meta(meta.clone()) {
                    return Err(ToolError::invalid_params("Invalid response meta")
                        .with_hint(
                            "meta accepts code (integer), success (bool), eTag and message {content, title}.",
                        )
                        .with_details(serde_json::json!({ "meta": meta })));
                }
                if let Some(message) = args.get("message") {
                    if !response.set_meta_message(message.clone()) {
                        return Err(ToolError::invalid_params("Invalid response message")
                            .with_hint("message needs a string content and an optional title."));
                    }
                }
                if let Some(data) = args.get("data") {
                    response.set_data(data.clone());
                }
                Ok(response.to_array())
            }
            _ => Err(unknown_action_error("response", action, RESPONSE_ACTIONS)),
        }
    }
}

impl ToolHandler for ResponseManager {
    fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle_action", args.get("action"));
        self.handle_action(args)
    }
}
