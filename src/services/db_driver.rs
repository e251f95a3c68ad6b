use crate::errors::ToolError;
use crate::utils::fs_atomic::ensure_dir_for_file;
use crate::utils::sql::{build_delete, build_select, quote_identifier};
use crate::utils::text::{escape_sql_literal, strip_tags};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to prepare database file: {0}")]
    Io(#[from] std::io::Error),
    #[error("database connection lock is poisoned")]
    Poisoned,
}

impl From<DriverError> for ToolError {
    fn from(err: DriverError) -> Self {
        ToolError::internal(format!("Database error: {}", err))
    }
}

pub type Row = Map<String, Value>;

/// Database access used by table storages.
pub trait DbDriver: Send + Sync {
    /// Prefixed and quoted table name for an alias.
    fn full_table_name(&self, alias: &str) -> String;

    fn table_exists(&self, alias: &str) -> Result<bool, DriverError>;

    fn column_names(&self, full_name: &str) -> Result<Vec<String>, DriverError>;

    /// Executes a statement, returning the number of changed rows.
    fn query(&self, sql: &str) -> Result<usize, DriverError>;

    fn select(
        &self,
        fields: &str,
        full_name: &str,
        where_sql: &str,
        order_by: &str,
        limit_sql: &str,
    ) -> Result<Vec<Row>, DriverError>;

    fn delete(
        &self,
        full_name: &str,
        where_sql: &str,
        order_by: &str,
        limit_sql: &str,
    ) -> Result<usize, DriverError>;

    /// First column of the first row.
    fn get_value(&self, sql: &str) -> Result<Option<Value>, DriverError>;

    fn insert_id(&self) -> Result<i64, DriverError>;

    fn escape(&self, value: &str) -> String {
        escape_sql_literal(value)
    }

    fn strip_tags(&self, value: &str) -> String {
        strip_tags(value)
    }
}

pub struct SqliteDriver {
    conn: Mutex<Connection>,
    table_prefix: String,
}

impl SqliteDriver {
    pub fn open(path: impl AsRef<Path>, table_prefix: impl Into<String>) -> Result<Self, DriverError> {
        ensure_dir_for_file(path.as_ref())?;
        let conn = Connection::open(path)?;
        Ok(Self::from_connection(conn, table_prefix))
    }

    pub fn in_memory(table_prefix: impl Into<String>) -> Result<Self, DriverError> {
        Ok(Self::from_connection(Connection::open_in_memory()?, table_prefix))
    }

    fn from_connection(conn: Connection, table_prefix: impl Into<String>) -> Self {
        Self {
            conn: Mutex::new(conn),
            table_prefix: table_prefix.into(),
        }
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DriverError> {
        self.conn.lock().map_err(|_| DriverError::Poisoned)
    }
}

fn cell_to_value(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(number) => Value::from(number),
        ValueRef::Real(number) => Value::from(number),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl DbDriver for SqliteDriver {
    fn full_table_name(&self, alias: &str) -> String {
        let raw = format!("{}{}", self.table_prefix, alias);
        quote_identifier(&raw).unwrap_or(raw)
    }

    fn table_exists(&self, alias: &str) -> Result<bool, DriverError> {
        let conn = self.lock()?;
        let name = format!("{}{}", self.table_prefix, alias);
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn column_names(&self, full_name: &str) -> Result<Vec<String>, DriverError> {
        let conn = self.lock()?;
        let stmt = conn.prepare(&format!("SELECT * FROM {} WHERE 0", full_name))?;
        Ok(stmt.column_names().into_iter().map(str::to_string).collect())
    }

    fn query(&self, sql: &str) -> Result<usize, DriverError> {
        let conn = self.lock()?;
        Ok(conn.execute(sql, [])?)
    }

    fn select(
        &self,
        fields: &str,
        full_name: &str,
        where_sql: &str,
        order_by: &str,
        limit_sql: &str,
    ) -> Result<Vec<Row>, DriverError> {
        let conn = self.lock()?;
        let sql = build_select(fields, full_name, where_sql, order_by, limit_sql);
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut item = Row::new();
            for (index, column) in columns.iter().enumerate() {
                item.insert(column.clone(), cell_to_value(row.get_ref(index)?));
            }
            out.push(item);
        }
        Ok(out)
    }

    fn delete(
        &self,
        full_name: &str,
        where_sql: &str,
        order_by: &str,
        limit_sql: &str,
    ) -> Result<usize, DriverError> {
        self.query(&build_delete(full_name, where_sql, order_by, limit_sql))
    }

    fn get_value(&self, sql: &str) -> Result<Option<Value>, DriverError> {
        let conn = self.lock()?;
        let value = conn
            .query_row(sql, [], |row| Ok(cell_to_value(row.get_ref(0)?)))
            .optional()?;
        Ok(value)
    }

    fn insert_id(&self) -> Result<i64, DriverError> {
        Ok(self.lock()?.last_insert_rowid())
    }
}
