use serde_json::{Map, Value};

#[derive(Default)]
struct NormalizationState {
    renamed: Vec<Value>,
    ignored: Vec<Value>,
}

const OBJECTS_ACTION_ALIASES: &[(&str, &str)] = &[
    ("merge", "extend"),
    ("get_prop_value", "get_prop"),
    ("convert_type", "convert"),
];

const COLLECTION_ACTION_ALIASES: &[(&str, &str)] = &[
    ("get", "get_items"),
    ("get_one", "get_one_item"),
    ("update", "update_items"),
    ("delete", "delete_items"),
    ("convert", "convert_items_type"),
];

const CACHE_ACTION_ALIASES: &[(&str, &str)] = &[
    ("set", "save"),
    ("remove", "delete"),
    ("clear", "delete"),
];

const STORAGE_ACTION_ALIASES: &[(&str, &str)] = &[
    ("add", "items_add"),
    ("add_one", "items_add_one"),
    ("update", "items_update"),
    ("update_one", "items_update_one"),
    ("delete", "items_delete"),
    ("delete_one", "items_delete_one"),
    ("get", "items_get"),
    ("get_one", "items_get_one"),
];

fn action_aliases(tool: &str) -> &'static [(&'static str, &'static str)] {
    match tool {
        "objects" => OBJECTS_ACTION_ALIASES,
        "collection" => COLLECTION_ACTION_ALIASES,
        "cache" => CACHE_ACTION_ALIASES,
        "storage" => STORAGE_ACTION_ALIASES,
        _ => &[],
    }
}

/// `propAsResultKey` → `prop_as_result_key`, `items_getOne` → `items_get_one`.
pub fn to_snake_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for ch in value.trim().chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn rename_key(map: &mut Map<String, Value>, from_key: &str, to_key: &str, state: &mut NormalizationState) {
    if from_key == to_key || !map.contains_key(from_key) {
        return;
    }
    if map.contains_key(to_key) {
        map.remove(from_key);
        state.ignored.push(serde_json::json!({
            "from": from_key,
            "to": to_key,
            "reason": "canonical_already_set",
        }));
        return;
    }
    let entries = std::mem::take(map);
    for (key, value) in entries {
        if key == from_key {
            map.insert(to_key.to_string(), value);
        } else {
            map.insert(key, value);
        }
    }
    state.renamed.push(serde_json::json!({ "from": from_key, "to": to_key }));
}

fn normalize_action(raw: &str, tool: &str) -> String {
    let snake = to_snake_case(raw).to_lowercase();
    action_aliases(tool)
        .iter()
        .find(|(alias, _)| *alias == snake)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(snake)
}

/// Accepts camelCase argument names and action aliases; returns the canonical
/// args plus a report of what was renamed.
pub fn normalize_args_aliases(args: &Value, tool: &str) -> (Value, Option<Value>) {
    let Value::Object(map) = args else {
        return (args.clone(), None);
    };
    let mut out = map.clone();
    let mut state = NormalizationState::default();

    if let Some(raw) = out.get("action").and_then(Value::as_str).map(str::to_string) {
        let canonical = normalize_action(&raw, tool);
        if canonical != raw {
            out.insert("action".to_string(), Value::String(canonical.clone()));
            state.renamed.push(serde_json::json!({
                "from": raw,
                "to": canonical,
                "note": "action_alias",
            }));
        }
    }

    let keys: Vec<String> = out.keys().cloned().collect();
    for key in keys {
        rename_key(&mut out, &key, &to_snake_case(&key), &mut state);
    }

    let mut report = Map::new();
    if !state.renamed.is_empty() {
        report.insert("renamed".to_string(), Value::Array(state.renamed));
    }
    if !state.ignored.is_empty() {
        report.insert("ignored".to_string(), Value::Array(state.ignored));
    }
    let report = (!report.is_empty()).then_some(Value::Object(report));
    (Value::Object(out), report)
}
