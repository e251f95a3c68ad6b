use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use serde_json::Value;

pub fn unknown_action_error(tool: &str, action: Option<&Value>, known_actions: &[&str]) -> ToolError {
    let action = action.and_then(Value::as_str).unwrap_or("");
    let known: Vec<String> = known_actions.iter().map(|s| s.to_string()).collect();
    let did_you_mean = suggest(action, &known, 3);

    let mut hint = format!("Use one of: {}.", known.join(", "));
    if !did_you_mean.is_empty() {
        hint = format!("Did you mean: {}? {}", did_you_mean.join(", "), hint);
    }
    let message = if action.is_empty() {
        format!("{} requires an action", tool)
    } else {
        format!("Unknown {} action: {}", tool, action)
    };
    ToolError::invalid_params(message)
        .with_hint(hint)
        .with_details(serde_json::json!({
            "known_actions": known,
            "did_you_mean": did_you_mean,
        }))
}

pub fn unknown_tool_error(tool: &str, known_tools: &[String]) -> ToolError {
    let did_you_mean = suggest(tool, known_tools, 3);
    let mut err = ToolError::not_found(format!("Unknown tool: {}", tool)).with_details(
        serde_json::json!({ "known_tools": known_tools, "did_you_mean": did_you_mean }),
    );
    if !did_you_mean.is_empty() {
        err = err.with_hint(format!("Did you mean: {}?", did_you_mean.join(", ")));
    }
    err
}

pub fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ToolError::invalid_params(format!("{} is required", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_action_lists_known_and_suggests() {
        let err = unknown_action_error("cache", Some(&json!("sav")), &["save", "get"]);
        assert_eq!(err.message, "Unknown cache action: sav");
        assert_eq!(err.hint.as_deref(), Some("Did you mean: save? Use one of: save, get."));
    }

    #[test]
    fn missing_action_has_its_own_message() {
        let err = unknown_action_error("objects", None, &["extend"]);
        assert_eq!(err.message, "objects requires an action");
    }

    #[test]
    fn required_str_rejects_blank() {
        assert!(required_str(&json!({"name": " "}), "name").is_err());
        assert_eq!(required_str(&json!({"name": "x"}), "name").unwrap(), "x");
    }
}
