pub mod cache;
pub mod collection;
pub mod objects;
pub mod response;
pub mod storage;

use serde_json::Value;

pub(crate) fn arg_bool(args: &Value, key: &str, default: bool) -> bool {
    match args.get(key) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(default),
        Some(Value::String(text)) => !matches!(text.trim(), "" | "0" | "false"),
        _ => default,
    }
}

pub(crate) fn arg_usize(args: &Value, key: &str) -> usize {
    match args.get(key) {
        Some(Value::Number(number)) => number.as_u64().unwrap_or(0) as usize,
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn arg_string(args: &Value, key: &str) -> Option<String> {
    match args.get(key) {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

pub(crate) fn arg_value(args: &Value, key: &str) -> Value {
    args.get(key).cloned().unwrap_or(Value::Null)
}
