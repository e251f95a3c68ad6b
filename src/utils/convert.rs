use crate::utils::merge::{is_container, set_entry};
use serde_json::{Map, Value};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConvertType {
    #[default]
    ObjectAuto,
    ObjectStdClass,
    ObjectArray,
    StringQueryFormatted,
    StringHtmlAttrs,
    StringJsonAuto,
    StringJsonObject,
    StringJsonArray,
}

impl FromStr for ConvertType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "objectauto" => Ok(ConvertType::ObjectAuto),
            "objectstdclass" => Ok(ConvertType::ObjectStdClass),
            "objectarray" => Ok(ConvertType::ObjectArray),
            "stringqueryformatted" | "stringqueryformated" => Ok(ConvertType::StringQueryFormatted),
            "stringhtmlattrs" => Ok(ConvertType::StringHtmlAttrs),
            "stringjsonauto" => Ok(ConvertType::StringJsonAuto),
            "stringjsonobject" => Ok(ConvertType::StringJsonObject),
            "stringjsonarray" => Ok(ConvertType::StringJsonArray),
            other => Err(format!("Unknown convert type: {}", other)),
        }
    }
}

/// Converts between containers, JSON text, query strings and HTML attributes.
///
/// Never fails: text that is neither JSON nor a query string ends up as an
/// (often empty) mapping.
pub fn convert_type(object: &Value, target: ConvertType) -> Value {
    let parsed = if is_container(object) {
        object.clone()
    } else {
        parse_scalar(object)
    };

    match target {
        ConvertType::ObjectAuto => parsed,
        ConvertType::ObjectStdClass => Value::Object(force_mapping(parsed)),
        ConvertType::ObjectArray => force_container(parsed),
        ConvertType::StringQueryFormatted => Value::String(build_query(&parsed)),
        ConvertType::StringHtmlAttrs => Value::String(build_html_attrs(&parsed)),
        ConvertType::StringJsonAuto => Value::String(to_json_string(&parsed)),
        ConvertType::StringJsonObject => {
            Value::String(to_json_string(&Value::Object(force_mapping(parsed))))
        }
        ConvertType::StringJsonArray => {
            Value::String(to_json_string(&Value::Array(values_of(parsed))))
        }
    }
}

pub fn is_empty_scalar(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn parse_scalar(object: &Value) -> Value {
    if is_empty_scalar(object) {
        return Value::Object(Map::new());
    }
    let text = scalar_to_string(object);
    let looks_like_json = matches!(text.trim_start().chars().next(), Some('{') | Some('['));
    if looks_like_json {
        if let Ok(parsed) = serde_json::from_str::<Value>(&text) {
            return parsed;
        }
    }
    parse_query(&text)
}

/// `a=1&b[c]=2&d[]=x` into nested containers. Values stay strings.
pub fn parse_query(text: &str) -> Value {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(text).unwrap_or_default();
    let mut root = Value::Object(Map::new());
    for (raw_key, value) in pairs {
        let segments = split_query_key(&raw_key);
        if segments.is_empty() {
            continue;
        }
        insert_query_path(&mut root, &segments, Value::String(value));
    }
    root
}

fn split_query_key(raw: &str) -> Vec<String> {
    let Some(open) = raw.find('[') else {
        return if raw.is_empty() {
            Vec::new()
        } else {
            vec![raw.to_string()]
        };
    };
    let head = &raw[..open];
    if head.is_empty() {
        return Vec::new();
    }
    let mut segments = vec![head.to_string()];
    let mut rest = &raw[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(close) => {
                segments.push(stripped[..close].to_string());
                rest = &stripped[close + 1..];
            }
            None => break,
        }
    }
    segments
}

fn insert_query_path(target: &mut Value, segments: &[String], value: Value) {
    let (head, tail) = match segments.split_first() {
        Some(parts) => parts,
        None => return,
    };
    let key = if head.is_empty() {
        next_index(target).to_string()
    } else {
        head.clone()
    };

    if tail.is_empty() {
        set_entry(target, key, value);
        return;
    }

    let mut child = match child_of(target, &key) {
        Some(existing) if is_container(existing) => existing.clone(),
        _ => {
            if tail.first().map(|s| s.is_empty()).unwrap_or(false) {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            }
        }
    };
    insert_query_path(&mut child, tail, value);
    set_entry(target, key, child);
}

fn next_index(target: &Value) -> usize {
    match target {
        Value::Array(items) => items.len(),
        Value::Object(map) => map
            .keys()
            .filter_map(|k| k.parse::<usize>().ok())
            .max()
            .map(|max| max + 1)
            .unwrap_or(0),
        _ => 0,
    }
}

fn child_of<'a>(target: &'a Value, key: &str) -> Option<&'a Value> {
    match target {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

pub fn force_mapping(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        Value::Null => Map::new(),
        scalar => {
            let mut map = Map::new();
            map.insert("scalar".to_string(), scalar);
            map
        }
    }
}

fn force_container(value: Value) -> Value {
    match value {
        Value::Null => Value::Array(Vec::new()),
        container @ (Value::Object(_) | Value::Array(_)) => container,
        scalar => Value::Array(vec![scalar]),
    }
}

pub fn values_of(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Null => Vec::new(),
        scalar => vec![scalar],
    }
}

/// Textual rendering used wherever a value is handled as a string.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => (if *flag { "1" } else { "" }).to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        container => to_json_string(container),
    }
}

/// JSON without escaped unicode or slashes.
pub fn to_json_string(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

pub fn build_query(value: &Value) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    if let Value::Object(_) | Value::Array(_) = value {
        flatten_query(value, None, &mut pairs);
    }
    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}

fn flatten_query(value: &Value, prefix: Option<&str>, pairs: &mut Vec<(String, String)>) {
    let entries: Vec<(String, &Value)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => return,
    };
    for (key, item) in entries {
        let full_key = match prefix {
            Some(parent) => format!("{}[{}]", parent, key),
            None => key,
        };
        match item {
            Value::Null => {}
            Value::Bool(flag) => pairs.push((full_key, (if *flag { "1" } else { "0" }).to_string())),
            Value::Object(_) | Value::Array(_) => flatten_query(item, Some(&full_key), pairs),
            other => pairs.push((full_key, scalar_to_string(other))),
        }
    }
}

fn build_html_attrs(value: &Value) -> String {
    let entries: Vec<(String, &Value)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    };
    entries
        .into_iter()
        .map(|(name, item)| {
            let rendered = match item {
                Value::Bool(flag) => (if *flag { "1" } else { "0" }).to_string(),
                Value::Object(_) | Value::Array(_) => to_json_string(item),
                other => scalar_to_string(other),
            };
            format!("{}='{}'", name, rendered)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_strings() {
        assert_eq!(
            convert_type(&json!(" {\"a\": 1}"), ConvertType::ObjectAuto),
            json!({"a": 1})
        );
        assert_eq!(
            convert_type(&json!("[1, 2]"), ConvertType::ObjectArray),
            json!([1, 2])
        );
    }

    #[test]
    fn falls_back_to_query_strings() {
        assert_eq!(
            convert_type(&json!("a=1&b[c]=x&d[]=p&d[]=q"), ConvertType::ObjectAuto),
            json!({"a": "1", "b": {"c": "x"}, "d": ["p", "q"]})
        );
        assert_eq!(
            convert_type(&json!("{broken"), ConvertType::ObjectAuto),
            json!({"{broken": ""})
        );
    }

    #[test]
    fn empty_input_is_empty_mapping() {
        assert_eq!(convert_type(&Value::Null, ConvertType::ObjectAuto), json!({}));
        assert_eq!(convert_type(&json!(""), ConvertType::ObjectStdClass), json!({}));
    }

    #[test]
    fn forces_container_kinds() {
        assert_eq!(
            convert_type(&json!(["x", "y"]), ConvertType::ObjectStdClass),
            json!({"0": "x", "1": "y"})
        );
        assert_eq!(
            convert_type(&json!({"a": 1, "b": 2}), ConvertType::StringJsonArray),
            json!("[1,2]")
        );
    }

    #[test]
    fn builds_query_strings() {
        let value = json!({"a": 1, "b": {"c": true}, "skip": null, "list": ["x y"]});
        assert_eq!(
            convert_type(&value, ConvertType::StringQueryFormatted),
            json!("a=1&b%5Bc%5D=1&list%5B0%5D=x+y")
        );
    }

    #[test]
    fn builds_html_attrs() {
        let value = json!({"id": "main", "hidden": false, "data": {"k": "v"}});
        assert_eq!(
            convert_type(&value, ConvertType::StringHtmlAttrs),
            json!("id='main' hidden='0' data='{\"k\":\"v\"}'")
        );
    }

    #[test]
    fn json_output_keeps_unicode_and_slashes() {
        let value = json!({"path": "a/b", "text": "привет"});
        assert_eq!(
            convert_type(&value, ConvertType::StringJsonAuto),
            json!("{\"path\":\"a/b\",\"text\":\"привет\"}")
        );
    }

    #[test]
    fn type_names_are_case_insensitive() {
        assert_eq!("OBJECTSTDCLASS".parse::<ConvertType>(), Ok(ConvertType::ObjectStdClass));
        assert_eq!(
            "stringQueryFormated".parse::<ConvertType>(),
            Ok(ConvertType::StringQueryFormatted)
        );
        assert!("nope".parse::<ConvertType>().is_err());
    }
}
