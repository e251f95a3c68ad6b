use serde_json::{Map, Value};

pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// `Null`, `""` and empty containers. `false` and `0` are values.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct ExtendOptions {
    pub deep: bool,
    pub overwrite_with_empty: bool,
    /// Keys outside the list are ignored. `None` or an empty list means all keys.
    pub extendable_properties: Option<Vec<String>>,
}

impl Default for ExtendOptions {
    fn default() -> Self {
        Self {
            deep: true,
            overwrite_with_empty: true,
            extendable_properties: None,
        }
    }
}

/// Folds `objects` into the first one.
///
/// The first container is the base and decides the output kind; a missing or
/// scalar base becomes an empty mapping. Scalar sources are skipped.
pub fn extend(objects: &[Value], options: &ExtendOptions) -> Value {
    let mut sources = objects.iter();
    let mut result = match sources.next() {
        Some(base) if is_container(base) => base.clone(),
        _ => Value::Object(Map::new()),
    };
    for source in sources {
        extend_into(&mut result, source, options);
    }
    result
}

pub fn extend_into(result: &mut Value, source: &Value, options: &ExtendOptions) {
    if !is_container(source) {
        return;
    }
    let allow_list = options
        .extendable_properties
        .as_ref()
        .filter(|list| !list.is_empty());

    for (key, incoming) in container_entries(source) {
        if let Some(list) = allow_list {
            if !list.iter().any(|name| *name == key) {
                continue;
            }
        }

        let existing = entry(result, &key);
        if !options.overwrite_with_empty && !is_incoming_used(existing, incoming) {
            continue;
        }

        let value = if options.deep && is_container(incoming) {
            let mut base = match existing {
                Some(current) if is_container(current) => current.clone(),
                _ => empty_like(incoming),
            };
            let nested = ExtendOptions {
                deep: true,
                overwrite_with_empty: options.overwrite_with_empty,
                extendable_properties: None,
            };
            extend_into(&mut base, incoming, &nested);
            base
        } else {
            incoming.clone()
        };

        set_entry(result, key, value);
    }
}

// With overwriting-by-empty disabled, an empty incoming value only lands on an
// absent key, or on an empty value of a different concrete type.
fn is_incoming_used(existing: Option<&Value>, incoming: &Value) -> bool {
    let Some(current) = existing else {
        return true;
    };
    if !is_empty_value(incoming) {
        return true;
    }
    is_empty_value(current) && current != incoming
}

fn empty_like(value: &Value) -> Value {
    match value {
        Value::Array(_) => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    }
}

fn container_entries(source: &Value) -> Vec<(String, &Value)> {
    match source {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, v)| (index.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

fn entry<'a>(target: &'a Value, key: &str) -> Option<&'a Value> {
    match target {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
        _ => None,
    }
}

/// Writes `key` into a container. Sequences replace by index or append;
/// any other key promotes the sequence to a mapping.
pub fn set_entry(target: &mut Value, key: String, value: Value) {
    if let Value::Array(items) = target {
        match key.parse::<usize>() {
            Ok(index) if index < items.len() => {
                items[index] = value;
                return;
            }
            Ok(index) if index == items.len() => {
                items.push(value);
                return;
            }
            _ => {
                let promoted: Map<String, Value> = std::mem::take(items)
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item))
                    .collect();
                *target = Value::Object(promoted);
            }
        }
    }
    if let Value::Object(map) = target {
        map.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_empty() -> ExtendOptions {
        ExtendOptions {
            overwrite_with_empty: false,
            ..ExtendOptions::default()
        }
    }

    #[test]
    fn later_sources_win_and_recurse() {
        let merged = extend(
            &[
                json!({"a": 1, "nested": {"x": 1, "y": 2}}),
                json!({"b": 2, "nested": {"y": 3}}),
            ],
            &ExtendOptions::default(),
        );
        assert_eq!(merged, json!({"a": 1, "nested": {"x": 1, "y": 3}, "b": 2}));
    }

    #[test]
    fn shallow_merge_replaces_containers() {
        let options = ExtendOptions {
            deep: false,
            ..ExtendOptions::default()
        };
        let merged = extend(&[json!({"n": {"x": 1}}), json!({"n": {"y": 2}})], &options);
        assert_eq!(merged, json!({"n": {"y": 2}}));
    }

    #[test]
    fn conflicting_types_take_the_later_type() {
        let merged = extend(
            &[json!({"a": "text"}), json!({"a": {"k": true}})],
            &ExtendOptions::default(),
        );
        assert_eq!(merged, json!({"a": {"k": true}}));
    }

    #[test]
    fn empty_values_do_not_overwrite_when_disabled() {
        assert_eq!(extend(&[json!({"a": 1}), json!({"a": null})], &no_empty()), json!({"a": 1}));
        assert_eq!(extend(&[json!({"a": 1}), json!({"a": ""})], &no_empty()), json!({"a": 1}));
        assert_eq!(extend(&[json!({"a": [1]}), json!({"a": []})], &no_empty()), json!({"a": [1]}));
    }

    #[test]
    fn different_empty_types_still_overwrite() {
        assert_eq!(extend(&[json!({"a": null}), json!({"a": ""})], &no_empty()), json!({"a": ""}));
        assert_eq!(extend(&[json!({"a": []}), json!({"a": {}})], &no_empty()), json!({"a": {}}));
        assert_eq!(extend(&[json!({"a": ""}), json!({"a": ""})], &no_empty()), json!({"a": ""}));
    }

    #[test]
    fn empty_values_fill_absent_keys() {
        assert_eq!(extend(&[json!({}), json!({"a": null})], &no_empty()), json!({"a": null}));
    }

    #[test]
    fn allow_list_restricts_keys() {
        let options = ExtendOptions {
            extendable_properties: Some(vec!["a".to_string()]),
            ..ExtendOptions::default()
        };
        let merged = extend(&[json!({"a": 1}), json!({"a": 2, "b": 3})], &options);
        assert_eq!(merged, json!({"a": 2}));
    }

    #[test]
    fn empty_allow_list_means_all_keys() {
        let options = ExtendOptions {
            extendable_properties: Some(Vec::new()),
            ..ExtendOptions::default()
        };
        let merged = extend(&[json!({"a": 1}), json!({"b": 3})], &options);
        assert_eq!(merged, json!({"a": 1, "b": 3}));
    }

    #[test]
    fn invalid_base_defaults_to_mapping() {
        assert_eq!(extend(&[json!("nope"), json!({"a": 1})], &ExtendOptions::default()), json!({"a": 1}));
        assert_eq!(extend(&[], &ExtendOptions::default()), json!({}));
    }

    #[test]
    fn sequence_base_replaces_by_index_and_appends() {
        let merged = extend(&[json!([1, 2]), json!([9, 8, 7])], &ExtendOptions::default());
        assert_eq!(merged, json!([9, 8, 7]));
    }

    #[test]
    fn sequence_base_promotes_on_string_keys() {
        let merged = extend(&[json!(["a"]), json!({"k": "v"})], &ExtendOptions::default());
        assert_eq!(merged, json!({"0": "a", "k": "v"}));
    }

    #[test]
    fn merge_is_associative() {
        let a = json!({"x": {"a": 1}, "list": [1]});
        let b = json!({"x": {"b": 2}, "y": null});
        let c = json!({"x": {"a": 3}, "list": [null, 2]});
        let options = ExtendOptions::default();
        let all = extend(&[a.clone(), b.clone(), c.clone()], &options);
        let staged = extend(&[extend(&[a, b], &options), c], &options);
        assert_eq!(all, staged);
    }

    #[test]
    fn output_does_not_alias_inputs() {
        let nested = json!({"inner": {"v": 1}});
        let mut merged = extend(&[json!({}), nested.clone()], &ExtendOptions::default());
        merged["inner"]["v"] = json!(2);
        assert_eq!(nested["inner"]["v"], json!(1));
    }
}
