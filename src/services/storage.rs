use crate::errors::ToolError;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct ItemsAddParams {
    /// Sequence, mapping (values are used) or a string convertible to either.
    pub items: Value,
}

#[derive(Debug, Clone, Default)]
pub struct ItemsUpdateParams {
    /// Null or `""` for every item, a raw SQL string, or a column → value(s) mapping.
    pub where_clause: Value,
    pub data: Value,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ItemsUpdateOneParams {
    pub where_clause: Value,
    pub data: Value,
    /// Insert `data` as a new item when nothing matched.
    pub is_enabled_add_not_found: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ItemsDeleteParams {
    pub where_clause: Value,
    pub order_by: String,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct ItemsGetParams {
    pub where_clause: Value,
    pub order_by: String,
    /// `"*"`, a comma-separated string or a sequence of names.
    pub props_to_return: Value,
    pub limit: usize,
    pub offset: usize,
    pub prop_as_result_key: Option<String>,
    pub prop_as_result_value: Option<String>,
}

impl Default for ItemsGetParams {
    fn default() -> Self {
        Self {
            where_clause: Value::Null,
            order_by: String::new(),
            props_to_return: Value::String("*".to_string()),
            limit: 0,
            offset: 0,
            prop_as_result_key: None,
            prop_as_result_value: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemsGetOneParams {
    pub where_clause: Value,
    pub order_by: String,
    pub props_to_return: Value,
    pub not_found_result: Value,
}

impl Default for ItemsGetOneParams {
    fn default() -> Self {
        Self {
            where_clause: Value::Null,
            order_by: String::new(),
            props_to_return: Value::String("*".to_string()),
            not_found_result: Value::Null,
        }
    }
}

/// Item storage. Backends implement the four bulk operations; the
/// single-item variants are derived from them.
pub trait Storage: Send + Sync {
    /// Returns the added items with their new `id`. Items that fail to insert are left out.
    fn items_add(&self, params: ItemsAddParams) -> Result<Vec<Value>, ToolError>;

    /// Returns `{id, ...data}` for every updated item.
    fn items_update(&self, params: ItemsUpdateParams) -> Result<Vec<Value>, ToolError>;

    fn items_delete(&self, params: ItemsDeleteParams) -> Result<(), ToolError>;

    /// A sequence, or a mapping when `prop_as_result_key` is set.
    fn items_get(&self, params: ItemsGetParams) -> Result<Value, ToolError>;

    fn items_add_one(&self, data: Value) -> Result<Option<Value>, ToolError> {
        let added = self.items_add(ItemsAddParams {
            items: Value::Array(vec![data]),
        })?;
        Ok(added.into_iter().next())
    }

    fn items_update_one(&self, params: ItemsUpdateOneParams) -> Result<Option<Value>, ToolError> {
        let updated = self.items_update(ItemsUpdateParams {
            where_clause: params.where_clause,
            data: params.data.clone(),
            limit: 1,
            offset: 0,
        })?;
        match updated.into_iter().next() {
            Some(item) => Ok(Some(item)),
            None if params.is_enabled_add_not_found => self.items_add_one(params.data),
            None => Ok(None),
        }
    }

    fn items_delete_one(&self, params: ItemsDeleteParams) -> Result<(), ToolError> {
        self.items_delete(ItemsDeleteParams { limit: 1, ..params })
    }

    fn items_get_one(&self, params: ItemsGetOneParams) -> Result<Value, ToolError> {
        let found = self.items_get(ItemsGetParams {
            where_clause: params.where_clause,
            order_by: params.order_by,
            props_to_return: params.props_to_return,
            limit: 1,
            ..ItemsGetParams::default()
        })?;
        let first = match found {
            Value::Array(items) => items.into_iter().next(),
            _ => None,
        };
        Ok(first.unwrap_or(params.not_found_result))
    }
}
