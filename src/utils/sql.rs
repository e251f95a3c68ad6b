use crate::errors::ToolError;

pub fn quote_identifier(value: &str) -> Result<String, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid_params("Identifier must be a non-empty string"));
    }
    if trimmed.contains('\0') {
        return Err(ToolError::invalid_params("Identifier must not contain null bytes"));
    }
    let unquoted = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('`') && trimmed.ends_with('`')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    Ok(format!("\"{}\"", unquoted.replace('"', "\"\"")))
}

pub fn quote_literal(escaped: &str) -> String {
    format!("'{}'", escaped)
}

/// One `WHERE` term: `"col" = 'v'` for a single value, `"col" IN (...)` otherwise.
pub fn build_condition(column_sql: &str, literals: &[String], case_insensitive: bool) -> Option<String> {
    let collate = if case_insensitive { " COLLATE NOCASE" } else { "" };
    match literals {
        [] => None,
        [single] => Some(format!("{}{} = {}", column_sql, collate, single)),
        many => Some(format!("{}{} IN ({})", column_sql, collate, many.join(","))),
    }
}

pub fn join_conditions(conditions: Vec<String>) -> String {
    conditions.join(" AND ")
}

/// `LIMIT n` / `LIMIT n OFFSET m`; empty when `limit` is 0.
pub fn build_limit_clause(limit: usize, offset: usize) -> String {
    match (limit, offset) {
        (0, _) => String::new(),
        (limit, 0) => format!("LIMIT {}", limit),
        (limit, offset) => format!("LIMIT {} OFFSET {}", limit, offset),
    }
}

pub fn build_select(
    fields: &str,
    table: &str,
    where_sql: &str,
    order_by: &str,
    limit_sql: &str,
) -> String {
    let mut sql = format!("SELECT {} FROM {}", fields, table);
    append_tail(&mut sql, where_sql, order_by, limit_sql);
    sql
}

/// SQLite lacks `DELETE ... LIMIT` by default, so ordered or limited deletes go through rowids.
pub fn build_delete(table: &str, where_sql: &str, order_by: &str, limit_sql: &str) -> String {
    if order_by.trim().is_empty() && limit_sql.trim().is_empty() {
        let mut sql = format!("DELETE FROM {}", table);
        append_tail(&mut sql, where_sql, "", "");
        return sql;
    }
    format!(
        "DELETE FROM {} WHERE rowid IN ({})",
        table,
        build_select("rowid", table, where_sql, order_by, limit_sql)
    )
}

fn append_tail(sql: &mut String, where_sql: &str, order_by: &str, limit_sql: &str) {
    if !where_sql.trim().is_empty() {
        sql.push_str(&format!(" WHERE {}", where_sql.trim()));
    }
    if !order_by.trim().is_empty() {
        sql.push_str(&format!(" ORDER BY {}", order_by.trim()));
    }
    if !limit_sql.trim().is_empty() {
        sql.push(' ');
        sql.push_str(limit_sql.trim());
    }
}
