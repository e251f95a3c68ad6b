use crate::constants::storage::{DEFAULT_COLUMN_ATTRS, ID_COLUMN, ID_COLUMN_ATTRS};
use crate::errors::ToolError;
use crate::services::collection::{
    AddItemsParams, GetItemsParams, ItemAdapter, ObjectCollection, PlainItems,
};
use crate::services::db_driver::DbDriver;
use crate::services::logger::Logger;
use crate::services::storage::{
    ItemsAddParams, ItemsDeleteParams, ItemsGetParams, ItemsUpdateParams, Storage,
};
use crate::utils::convert::{convert_type, force_mapping, scalar_to_string, values_of, ConvertType};
use crate::utils::filter::ItemsFilter;
use crate::utils::merge::{extend, is_empty_value, ExtendOptions};
use crate::utils::sql::{
    build_condition, build_limit_clause, join_conditions, quote_identifier, quote_literal,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnSpec {
    pub name: String,
    /// Column definition used when the column has to be created.
    pub attrs: String,
    pub is_read_only: bool,
    pub is_public: bool,
    pub is_compared_case_sensitive: bool,
    pub is_tags_allowed: bool,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            attrs: DEFAULT_COLUMN_ATTRS.to_string(),
            is_read_only: false,
            is_public: false,
            is_compared_case_sensitive: false,
            is_tags_allowed: false,
        }
    }
}

impl ColumnSpec {
    pub fn id() -> Self {
        Self {
            name: ID_COLUMN.to_string(),
            attrs: ID_COLUMN_ATTRS.to_string(),
            is_read_only: true,
            is_compared_case_sensitive: true,
            ..Self::default()
        }
    }
}

/// Column definitions stored as typed specs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnItems;

impl ItemAdapter for ColumnItems {
    type Item = ColumnSpec;

    fn from_value(value: Value) -> ColumnSpec {
        let value = match value {
            Value::String(name) => serde_json::json!({ "name": name }),
            other => other,
        };
        let mut spec: ColumnSpec = serde_json::from_value(value).unwrap_or_default();
        if spec.attrs.trim().is_empty() {
            spec.attrs = DEFAULT_COLUMN_ATTRS.to_string();
        }
        spec
    }

    fn to_value(item: &ColumnSpec) -> Value {
        serde_json::to_value(item).unwrap_or(Value::Null)
    }

    fn item_data(item: &ColumnSpec) -> Cow<'_, Value> {
        Cow::Owned(Self::to_value(item))
    }

    fn set_item_data(item: &mut ColumnSpec, data: Value) {
        *item = Self::from_value(data);
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableParams {
    /// Table name without the driver's prefix. Empty skips schema reconciliation.
    pub name_alias: String,
    /// Extra columns as names or column specs; they are public unless stated otherwise.
    pub columns: Vec<Value>,
}

/// Table-backed [`Storage`]. Only declared columns are ever read or written.
pub struct DbTable {
    logger: Logger,
    driver: Arc<dyn DbDriver>,
    name_alias: String,
    name_full: String,
    columns: ObjectCollection<ColumnItems>,
}

impl DbTable {
    pub fn new(driver: Arc<dyn DbDriver>, params: TableParams) -> Result<Self, ToolError> {
        Self::with_logger(Logger::new("ddtools"), driver, params)
    }

    pub fn with_logger(
        logger: Logger,
        driver: Arc<dyn DbDriver>,
        params: TableParams,
    ) -> Result<Self, ToolError> {
        let mut columns: ObjectCollection<ColumnItems> = ObjectCollection::default();
        columns.push(ColumnSpec::id());

        let public_default = serde_json::json!({ "isPublic": true });
        for column in params.columns {
            let column = match column {
                Value::String(name) => serde_json::json!({ "name": name }),
                other => other,
            };
            let spec = ColumnItems::from_value(extend(
                &[public_default.clone(), column],
                &ExtendOptions::default(),
            ));
            if spec.name.trim().is_empty() {
                return Err(ToolError::invalid_params("Column name must be a non-empty string")
                    .with_hint("Pass columns as names or as {\"name\": ...} objects."));
            }
            quote_identifier(&spec.name)?;
            columns.push(spec);
        }

        let name_full = driver.full_table_name(&params.name_alias);
        let table = Self {
            logger: logger.child(&format!("table:{}", params.name_alias)),
            driver,
            name_alias: params.name_alias,
            name_full,
            columns,
        };
        table.reconcile_schema()?;
        Ok(table)
    }

    pub fn name_alias(&self) -> &str {
        &self.name_alias
    }

    pub fn name_full(&self) -> &str {
        &self.name_full
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        self.columns.items()
    }

    fn reconcile_schema(&self) -> Result<(), ToolError> {
        if self.name_alias.is_empty() {
            return Ok(());
        }
        let exists = self.driver.table_exists(&self.name_alias)?;
        let existing = if exists {
            self.driver.column_names(&self.name_full)?
        } else {
            Vec::new()
        };

        let mut missing = Vec::new();
        for column in self.columns.items() {
            if existing.iter().any(|name| name == &column.name) {
                continue;
            }
            missing.push(format!("{} {}", quote_identifier(&column.name)?, column.attrs));
        }
        if missing.is_empty() {
            return Ok(());
        }

        if exists {
            for definition in &missing {
                self.driver
                    .query(&format!("ALTER TABLE {} ADD COLUMN {}", self.name_full, definition))?;
            }
        } else {
            self.driver.query(&format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                self.name_full,
                missing.join(", ")
            ))?;
        }
        self.logger.info(
            "schema updated",
            Some(&serde_json::json!({"table": self.name_full, "columns": missing})),
        );
        Ok(())
    }

    fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.items().iter().find(|column| column.name == name)
    }

    fn column_names_where(&self, filter: &str) -> Vec<String> {
        self.columns
            .filtered(&ItemsFilter::parse(filter), 0)
            .into_iter()
            .map(|column| column.name.clone())
            .collect()
    }

    /// Requested names that are declared columns, in request order.
    pub fn valid_column_names(&self, requested: &Value) -> Vec<String> {
        let all = self.column_names_where("");
        let requested: Vec<String> = match requested {
            Value::String(text) if text.trim() == "*" || text.trim().is_empty() => return all,
            Value::Null => return all,
            Value::String(text) => text.split(',').map(|name| name.trim().to_string()).collect(),
            Value::Array(items) if items.is_empty() => return all,
            other => values_of(other.clone()).iter().map(scalar_to_string).collect(),
        };
        requested
            .into_iter()
            .filter(|name| all.contains(name))
            .collect()
    }

    /// Keeps only the declared columns of `data`.
    fn validate_data(&self, data: &Value) -> Map<String, Value> {
        let data = match data {
            Value::String(_) => convert_type(data, ConvertType::ObjectStdClass),
            other => other.clone(),
        };
        force_mapping(data)
            .into_iter()
            .filter(|(name, _)| self.column(name).is_some())
            .collect()
    }

    fn escape_value(&self, column: &str, value: &Value) -> String {
        let text = scalar_to_string(value);
        let allows_tags = self.column(column).map(|c| c.is_tags_allowed).unwrap_or(false);
        let text = if allows_tags {
            text
        } else {
            self.driver.strip_tags(&text)
        };
        quote_literal(&self.driver.escape(&text))
    }

    pub fn prepare_where(&self, where_clause: &Value) -> Result<String, ToolError> {
        if is_empty_value(where_clause) {
            return Ok(String::new());
        }
        if let Value::String(raw) = where_clause {
            return Ok(raw.clone());
        }

        let mut conditions = Vec::new();
        for (name, value) in self.validate_data(where_clause) {
            let variants = match value {
                Value::Array(items) => items,
                other => vec![other],
            };
            let literals: Vec<String> = variants
                .iter()
                .map(|variant| self.escape_value(&name, variant))
                .collect();
            let case_insensitive = self
                .column(&name)
                .map(|c| !c.is_compared_case_sensitive)
                .unwrap_or(true);
            if let Some(condition) =
                build_condition(&quote_identifier(&name)?, &literals, case_insensitive)
            {
                conditions.push(condition);
            }
        }
        Ok(join_conditions(conditions))
    }

    pub fn build_set(&self, data: &Map<String, Value>) -> Result<String, ToolError> {
        let mut parts = Vec::with_capacity(data.len());
        for (name, value) in data {
            parts.push(format!(
                "{} = {}",
                quote_identifier(name)?,
                self.escape_value(name, value)
            ));
        }
        Ok(parts.join(", "))
    }

    fn build_insert(&self, data: &Map<String, Value>) -> Result<String, ToolError> {
        let mut names = Vec::with_capacity(data.len());
        let mut values = Vec::with_capacity(data.len());
        for (name, value) in data {
            names.push(quote_identifier(name)?);
            values.push(self.escape_value(name, value));
        }
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name_full,
            names.join(", "),
            values.join(", ")
        ))
    }
}

impl Storage for DbTable {
    fn items_add(&self, params: ItemsAddParams) -> Result<Vec<Value>, ToolError> {
        let items = match params.items {
            Value::Array(items) => items,
            other => values_of(convert_type(&other, ConvertType::ObjectArray)),
        };

        let mut added = Vec::new();
        for item in items {
            let item = match item {
                Value::Object(_) => item,
                other => convert_type(&other, ConvertType::ObjectStdClass),
            };
            let mut data: Map<String, Value> = self
                .validate_data(&item)
                .into_iter()
                .filter(|(name, _)| name != ID_COLUMN)
                .collect();
            if data.is_empty() {
                self.logger
                    .warn("insert skipped: no writable columns", Some(&item));
                continue;
            }
            let sql = self.build_insert(&data)?;

            let inserted = self
                .driver
                .query(&sql)
                .and_then(|_| self.driver.insert_id());
            match inserted {
                Ok(id) => {
                    data.insert(ID_COLUMN.to_string(), Value::from(id));
                    added.push(Value::Object(data));
                }
                Err(err) => self.logger.warn(
                    "insert failed",
                    Some(&serde_json::json!({"error": err.to_string()})),
                ),
            }
        }
        Ok(added)
    }

    fn items_update(&self, params: ItemsUpdateParams) -> Result<Vec<Value>, ToolError> {
        let read_only = self.column_names_where("isReadOnly==1");
        let data: Map<String, Value> = self
            .validate_data(&params.data)
            .into_iter()
            .filter(|(name, _)| !read_only.contains(name))
            .collect();
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let id_sql = quote_identifier(ID_COLUMN)?;
        let rows = self.driver.select(
            &id_sql,
            &self.name_full,
            &self.prepare_where(&params.where_clause)?,
            "",
            &build_limit_clause(params.limit, params.offset),
        )?;
        let ids: Vec<Value> = rows
            .into_iter()
            .filter_map(|mut row| row.remove(ID_COLUMN))
            .filter(|id| !id.is_null())
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list: Vec<String> = ids.iter().map(scalar_to_string).collect();
        self.driver.query(&format!(
            "UPDATE {} SET {} WHERE {} IN ({})",
            self.name_full,
            self.build_set(&data)?,
            id_sql,
            id_list.join(",")
        ))?;

        Ok(ids
            .into_iter()
            .map(|id| {
                let mut item = Map::new();
                item.insert(ID_COLUMN.to_string(), id);
                item.extend(data.clone());
                Value::Object(item)
            })
            .collect())
    }

    fn items_delete(&self, params: ItemsDeleteParams) -> Result<(), ToolError> {
        let removed = self.driver.delete(
            &self.name_full,
            &self.prepare_where(&params.where_clause)?,
            &params.order_by,
            &build_limit_clause(params.limit, params.offset),
        )?;
        self.logger
            .debug("deleted", Some(&serde_json::json!({"rows": removed})));
        Ok(())
    }

    fn items_get(&self, params: ItemsGetParams) -> Result<Value, ToolError> {
        let props = self.valid_column_names(&params.props_to_return);
        if props.is_empty() {
            return Ok(if params.prop_as_result_key.is_some() {
                Value::Object(Map::new())
            } else {
                Value::Array(Vec::new())
            });
        }

        let fields = props
            .iter()
            .map(|name| quote_identifier(name))
            .collect::<Result<Vec<_>, _>>()?
            .join(",");
        let rows = self.driver.select(
            &fields,
            &self.name_full,
            &self.prepare_where(&params.where_clause)?,
            &params.order_by,
            &build_limit_clause(params.limit, params.offset),
        )?;

        let found: ObjectCollection<PlainItems> = ObjectCollection::new(AddItemsParams {
            items: Value::Array(rows.into_iter().map(Value::Object).collect()),
            item_type: None,
        });
        Ok(found.get_items(&GetItemsParams {
            prop_as_result_key: params.prop_as_result_key,
            prop_as_result_value: params.prop_as_result_value,
            ..GetItemsParams::default()
        }))
    }
}
