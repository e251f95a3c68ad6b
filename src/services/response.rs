use crate::constants::response::{
    ALLOWED_MESSAGE_KEYS, ALLOWED_META_KEYS, CODE_FAILURE, CODE_SUCCESS, REQUIRED_MESSAGE_KEYS,
    REQUIRED_META_KEYS,
};
use crate::utils::convert::{convert_type, force_mapping, to_json_string, ConvertType};
use serde_json::{Map, Value};

/// `{meta, data}` envelope with a validated `meta` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    meta: Option<Map<String, Value>>,
    data: Option<Value>,
}

fn has_valid_keys(map: &Map<String, Value>, required: &[&str], allowed: &[&str]) -> bool {
    required.iter().all(|key| map.contains_key(*key))
        && map.keys().all(|key| allowed.contains(&key.as_str()))
}

fn as_mapping(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::String(_) => force_mapping(convert_type(&value, ConvertType::ObjectStdClass)),
        other => force_mapping(other),
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate_meta(meta: &Map<String, Value>) -> bool {
        has_valid_keys(meta, REQUIRED_META_KEYS, ALLOWED_META_KEYS)
            && meta.get("code").map(|code| code.is_i64() || code.is_u64()) == Some(true)
            && meta.get("success").map(Value::is_boolean) == Some(true)
            && match meta.get("message") {
                None | Some(Value::Null) => true,
                Some(message) => Self::validate_meta_message(message),
            }
    }

    pub fn validate_meta_message(message: &Value) -> bool {
        let Value::Object(map) = message else {
            return false;
        };
        has_valid_keys(map, REQUIRED_MESSAGE_KEYS, ALLOWED_MESSAGE_KEYS)
            && map.get("content").map(Value::is_string) == Some(true)
    }

    /// Fills `success` (true) and `code` (200/400) when missing. Invalid meta is rejected.
    pub fn set_meta(&mut self, meta: Value) -> bool {
        let mut meta = as_mapping(meta);
        if !meta.contains_key("success") {
            meta.insert("success".to_string(), Value::Bool(true));
        }
        if !meta.contains_key("code") {
            let success = meta.get("success").and_then(Value::as_bool).unwrap_or(false);
            let code = if success { CODE_SUCCESS } else { CODE_FAILURE };
            meta.insert("code".to_string(), Value::from(code));
        }
        if !Self::validate_meta(&meta) {
            return false;
        }
        self.meta = Some(meta);
        true
    }

    pub fn set_meta_message(&mut self, message: Value) -> bool {
        if !Self::validate_meta_message(&message) {
            return false;
        }
        if self.meta.is_none() {
            self.set_meta(Value::Object(Map::new()));
        }
        if let Some(meta) = self.meta.as_mut() {
            meta.insert("message".to_string(), message);
        }
        true
    }

    pub fn set_data(&mut self, data: Value) {
        self.data = Some(data);
    }

    /// Applies `meta` and/or `data` from one `{meta, data}` value.
    pub fn set_meta_data(&mut self, params: Value) {
        let mut params = as_mapping(params);
        if let Some(meta) = params.remove("meta") {
            self.set_meta(meta);
        }
        if let Some(data) = params.remove("data") {
            self.set_data(data);
        }
    }

    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.meta.as_ref()
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|meta| meta.get("success"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `data` is left out when it was never set or is null.
    pub fn to_array(&self) -> Value {
        let mut out = Map::new();
        out.insert(
            "meta".to_string(),
            self.meta.clone().map(Value::Object).unwrap_or(Value::Null),
        );
        if let Some(data) = self.data.as_ref().filter(|data| !data.is_null()) {
            out.insert("data".to_string(), data.clone());
        }
        Value::Object(out)
    }

    pub fn to_json(&self) -> String {
        to_json_string(&self.to_array())
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_json())
    }
}
