//! Schema-tolerant projections over Chromium SQLite tables
//!
//! Column sets drift between Chromium releases (`is_persistent` vs.
//! `persistent`, optional `encrypted_value`, ...). Queries are built from a
//! desired column list: present columns are selected, absent ones become
//! typed NULLs under the desired name, so rows can be read positionally
//! without per-version branching.

use crate::error::{ForensicsError, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::collections::HashSet;

/// Physical columns of a table
pub type ColumnSet = HashSet<String>;

/// SQLite affinity used for NULL placeholders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
    Blob,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Text => "TEXT",
            SqlType::Blob => "BLOB",
        }
    }
}

/// A column the caller wants, under its canonical name
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    /// Older or newer physical names for the same data, tried in order.
    pub alternates: &'static [&'static str],
    pub sql_type: SqlType,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            alternates: &[],
            sql_type,
        }
    }

    pub const fn with_alternates(
        name: &'static str,
        alternates: &'static [&'static str],
        sql_type: SqlType,
    ) -> Self {
        Self {
            name,
            alternates,
            sql_type,
        }
    }

    fn resolve(&self, actual: &ColumnSet) -> Option<&'static str> {
        std::iter::once(self.name)
            .chain(self.alternates.iter().copied())
            .find(|candidate| actual.contains(*candidate))
    }
}

/// Where one projected column comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    Physical(&'static str),
    Placeholder,
}

/// A query whose projection matches the desired column list exactly
#[derive(Debug, Clone)]
pub struct AdaptedQuery {
    pub sql: String,
    /// One entry per desired column, in desired order.
    pub columns: Vec<&'static str>,
    pub sources: Vec<ColumnSource>,
}

impl AdaptedQuery {
    pub fn placeholder_count(&self) -> usize {
        self.sources
            .iter()
            .filter(|source| **source == ColumnSource::Placeholder)
            .count()
    }
}

/// Build the projection of `desired` over `table`.
///
/// `actual` is `None` when the table does not exist, which is reported as
/// [`ForensicsError::TableAbsent`]. `order_by` is applied descending, and
/// only when that column is present.
pub fn build_query(
    table: &str,
    desired: &[ColumnSpec],
    actual: Option<&ColumnSet>,
    order_by: Option<&str>,
) -> Result<AdaptedQuery> {
    let actual = actual.ok_or_else(|| ForensicsError::TableAbsent(table.to_string()))?;

    let mut projections = Vec::with_capacity(desired.len());
    let mut sources = Vec::with_capacity(desired.len());
    for spec in desired {
        match spec.resolve(actual) {
            Some(physical) if physical == spec.name => {
                projections.push(quote_ident(physical));
                sources.push(ColumnSource::Physical(physical));
            }
            Some(physical) => {
                projections.push(format!(
                    "{} AS {}",
                    quote_ident(physical),
                    quote_ident(spec.name)
                ));
                sources.push(ColumnSource::Physical(physical));
            }
            None => {
                projections.push(format!(
                    "CAST(NULL AS {}) AS {}",
                    spec.sql_type.as_sql(),
                    quote_ident(spec.name)
                ));
                sources.push(ColumnSource::Placeholder);
            }
        }
    }

    let mut sql = format!("SELECT {} FROM {}", projections.join(", "), quote_ident(table));
    if let Some(order) = order_by.filter(|column| actual.contains(*column)) {
        sql.push_str(&format!(" ORDER BY {} DESC", quote_ident(order)));
    }

    Ok(AdaptedQuery {
        sql,
        columns: desired.iter().map(|spec| spec.name).collect(),
        sources,
    })
}

/// Physical column names of `table`, or `None` if the table is missing.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Option<ColumnSet>> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [table],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(None);
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut columns = ColumnSet::new();
    for row in rows {
        columns.insert(row?);
    }
    Ok(Some(columns))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// One result row, keyed by desired column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    entries: Vec<(String, Value)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((column.into(), value.into()));
    }

    /// Read a SQLite row produced by `query`.
    ///
    /// Fails when the row's arity does not match the projection.
    pub fn from_sql_row(row: &Row<'_>, query: &AdaptedQuery) -> Result<Self> {
        let arity = row.as_ref().column_count();
        if arity != query.columns.len() {
            return Err(ForensicsError::MalformedRow(format!(
                "expected {} columns, got {}",
                query.columns.len(),
                arity
            )));
        }
        let mut raw = RawRow::new();
        for (index, column) in query.columns.iter().enumerate() {
            raw.push(*column, row.get::<_, Value>(index)?);
        }
        Ok(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Integer view: NULL and unparsable text read as 0.
    pub fn int(&self, column: &str) -> i64 {
        match self.get(column) {
            Some(Value::Integer(value)) => *value,
            Some(Value::Real(value)) => *value as i64,
            Some(Value::Text(text)) => text.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }

    /// Text view: NULL reads as empty, blobs are decoded lossily.
    pub fn text(&self, column: &str) -> String {
        match self.get(column) {
            Some(Value::Text(text)) => text.clone(),
            Some(Value::Integer(value)) => value.to_string(),
            Some(Value::Real(value)) => value.to_string(),
            Some(Value::Blob(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
            _ => String::new(),
        }
    }

    /// Byte view: text is returned as its UTF-8 bytes.
    pub fn bytes(&self, column: &str) -> Vec<u8> {
        match self.get(column) {
            Some(Value::Blob(bytes)) => bytes.clone(),
            Some(Value::Text(text)) => text.as_bytes().to_vec(),
            _ => Vec::new(),
        }
    }

    pub fn flag(&self, column: &str) -> bool {
        self.int(column) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOKIE_COLUMNS: [ColumnSpec; 4] = [
        ColumnSpec::new("host_key", SqlType::Text),
        ColumnSpec::new("encrypted_value", SqlType::Blob),
        ColumnSpec::with_alternates("is_persistent", &["persistent"], SqlType::Integer),
        ColumnSpec::new("priority", SqlType::Integer),
    ];

    fn columns(names: &[&str]) -> ColumnSet {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn projection_keeps_desired_order_for_any_schema() {
        let schemas = [
            columns(&[]),
            columns(&["priority", "host_key"]),
            columns(&["persistent", "encrypted_value", "host_key", "priority", "extra"]),
            columns(&["host_key", "is_persistent", "persistent"]),
        ];
        for actual in &schemas {
            let query = build_query("cookies", &COOKIE_COLUMNS, Some(actual), None).expect("query");
            assert_eq!(query.columns, ["host_key", "encrypted_value", "is_persistent", "priority"]);
            assert_eq!(query.sources.len(), COOKIE_COLUMNS.len());
        }
    }

    #[test]
    fn alternates_and_placeholders_are_aliased() {
        let actual = columns(&["host_key", "persistent"]);
        let query = build_query("cookies", &COOKIE_COLUMNS, Some(&actual), Some("priority"))
            .expect("query");
        assert_eq!(
            query.sql,
            "SELECT \"host_key\", CAST(NULL AS BLOB) AS \"encrypted_value\", \
             \"persistent\" AS \"is_persistent\", CAST(NULL AS INTEGER) AS \"priority\" \
             FROM \"cookies\""
        );
        assert_eq!(query.sources[2], ColumnSource::Physical("persistent"));
        assert_eq!(query.placeholder_count(), 2);
    }

    #[test]
    fn missing_table_is_reported() {
        let err = build_query("cookies", &COOKIE_COLUMNS, None, None).expect_err("absent");
        assert!(matches!(err, ForensicsError::TableAbsent(table) if table == "cookies"));
    }

    #[test]
    fn adapted_query_runs_against_old_schema() {
        let conn = Connection::open_in_memory().expect("open db");
        conn.execute_batch(
            "CREATE TABLE cookies (host_key TEXT, persistent INTEGER, last_access_utc INTEGER);
             INSERT INTO cookies VALUES ('a.example', 1, 10);
             INSERT INTO cookies VALUES ('b.example', 0, 20);",
        )
        .expect("seed db");

        let actual = table_columns(&conn, "cookies").expect("columns");
        assert!(table_columns(&conn, "urls").expect("columns").is_none());
        let query = build_query(
            "cookies",
            &COOKIE_COLUMNS,
            actual.as_ref(),
            Some("last_access_utc"),
        )
        .expect("query");

        let mut stmt = conn.prepare(&query.sql).expect("prepare");
        let rows: Vec<RawRow> = stmt
            .query_map([], |row| Ok(RawRow::from_sql_row(row, &query)))
            .expect("query")
            .map(|row| row.expect("row").expect("raw row"))
            .collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("host_key"), "b.example");
        assert!(rows[1].flag("is_persistent"));
        assert!(rows[0].bytes("encrypted_value").is_empty());
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), query.columns);
    }

    #[test]
    fn raw_row_coerces_tolerantly() {
        let row = RawRow::new()
            .with("count", "12".to_string())
            .with("ratio", 2.9)
            .with("missing", Value::Null)
            .with("blob", vec![b'h', b'i']);
        assert_eq!(row.int("count"), 12);
        assert_eq!(row.int("ratio"), 2);
        assert_eq!(row.int("missing"), 0);
        assert_eq!(row.int("absent"), 0);
        assert_eq!(row.text("blob"), "hi");
        assert_eq!(row.text("missing"), "");
        assert_eq!(row.len(), 4);
    }
}
