use crate::utils::merge::is_container;
use serde_json::{Map, Value};

/// Single-level existence check. Mappings test the key, sequences test the
/// index; everything else has no properties.
pub fn is_prop_exists(target: &Value, prop_name: &str) -> bool {
    match target {
        Value::Object(map) => map.contains_key(prop_name),
        Value::Array(items) => parse_index(prop_name)
            .map(|index| index < items.len())
            .unwrap_or(false),
        _ => false,
    }
}

fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || (raw.len() > 1 && raw.starts_with('0')) {
        return None;
    }
    raw.parse::<usize>().ok()
}

fn single_level<'a>(target: &'a Value, prop_name: &str) -> Option<&'a Value> {
    match target {
        Value::Object(map) => map.get(prop_name),
        Value::Array(items) => parse_index(prop_name).and_then(|index| items.get(index)),
        _ => None,
    }
}

/// Resolves `prop_name` against `target`. The literal name wins; otherwise the
/// name is unfolded on `.` (`parent.child.0`). `Null` results fall back to
/// `not_found_result`.
pub fn get_prop_value(target: &Value, prop_name: &str, not_found_result: Option<&Value>) -> Value {
    let mut result = single_level(target, prop_name)
        .cloned()
        .unwrap_or(Value::Null);

    if result.is_null() && prop_name.contains('.') {
        result = resolve_dotted(target, prop_name);
    }

    match not_found_result {
        Some(fallback) if result.is_null() && !fallback.is_null() => fallback.clone(),
        _ => result,
    }
}

fn resolve_dotted(target: &Value, prop_name: &str) -> Value {
    let mut segments = prop_name.split('.');
    let Some(first) = segments.next() else {
        return Value::Null;
    };
    if !is_prop_exists(target, first) {
        return Value::Null;
    }
    let mut current = single_level(target, first);
    for segment in segments {
        current = match current {
            Some(value) if is_container(value) => single_level(value, segment),
            _ => return Value::Null,
        };
    }
    current.cloned().unwrap_or(Value::Null)
}

#[derive(Debug, Clone)]
pub struct UnfoldOptions {
    pub key_separator: String,
    pub key_prefix: String,
    pub is_cross_type_enabled: bool,
}

impl Default for UnfoldOptions {
    fn default() -> Self {
        Self {
            key_separator: ".".to_string(),
            key_prefix: String::new(),
            is_cross_type_enabled: false,
        }
    }
}

/// Flattens nested containers into one level of joined keys.
///
/// Only containers of the same kind as the root are unfolded unless
/// `is_cross_type_enabled` is set. The output is always a mapping; for a
/// sequence root it plays the role of an associative array.
pub fn unfold(target: &Value, options: &UnfoldOptions) -> Value {
    let mut out = Map::new();
    let is_source_object = target.is_object();
    unfold_into(
        target,
        &options.key_prefix,
        is_source_object,
        options,
        &mut out,
    );
    Value::Object(out)
}

fn unfold_into(
    target: &Value,
    prefix: &str,
    is_source_object: bool,
    options: &UnfoldOptions,
    out: &mut Map<String, Value>,
) {
    let entries: Vec<(String, &Value)> = match target {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, v)| (index.to_string(), v))
            .collect(),
        _ => return,
    };

    for (key, value) in entries {
        let should_unfold = (options.is_cross_type_enabled && is_container(value))
            || (is_source_object && value.is_object())
            || (!is_source_object && value.is_array());
        if should_unfold {
            let child_prefix = format!("{}{}{}", prefix, key, options.key_separator);
            unfold_into(value, &child_prefix, is_source_object, options, out);
        } else {
            out.insert(format!("{}{}", prefix, key), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prop_exists_for_null_values() {
        let item = json!({"a": null});
        assert!(is_prop_exists(&item, "a"));
        assert!(!is_prop_exists(&item, "b"));
        assert!(is_prop_exists(&json!(["x"]), "0"));
        assert!(!is_prop_exists(&json!(["x"]), "1"));
        assert!(!is_prop_exists(&json!("scalar"), "0"));
    }

    #[test]
    fn get_prop_value_unfolds_dotted_names() {
        let item = json!({"parent": {"items": [{"name": "first"}]}});
        assert_eq!(get_prop_value(&item, "parent.items.0.name", None), json!("first"));
        assert_eq!(get_prop_value(&item, "parent.items.1.name", None), Value::Null);
        assert_eq!(get_prop_value(&item, "parent.items.0.name.deeper", None), Value::Null);
    }

    #[test]
    fn literal_key_wins_over_unfolding() {
        let item = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(get_prop_value(&item, "a.b", None), json!(1));
    }

    #[test]
    fn not_found_result_replaces_null() {
        let item = json!({"a": null});
        assert_eq!(get_prop_value(&item, "a", Some(&json!("def"))), json!("def"));
        assert_eq!(get_prop_value(&item, "zzz", Some(&Value::Null)), Value::Null);
    }

    #[test]
    fn unfold_only_same_kind_by_default() {
        let source = json!({"a": {"b": 1, "c": [1, 2]}, "d": 3});
        assert_eq!(
            unfold(&source, &UnfoldOptions::default()),
            json!({"a.b": 1, "a.c": [1, 2], "d": 3})
        );
    }

    #[test]
    fn unfold_cross_type() {
        let source = json!({"a": {"c": [1, 2]}});
        let options = UnfoldOptions {
            is_cross_type_enabled: true,
            ..UnfoldOptions::default()
        };
        assert_eq!(unfold(&source, &options), json!({"a.c.0": 1, "a.c.1": 2}));
    }
}
