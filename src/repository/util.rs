//! Repository utilities.

use rusqlite::types::Value as SqlValue;
use sea_query::{SqliteQueryBuilder, Value, Values};

use super::StoreError;

/// A statement rendered for SQLite with its bound parameters.
#[derive(Debug, Clone)]
pub struct BoundStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Render a sea-query statement into SQLite text plus rusqlite parameters.
pub fn build_sql<S>(stmt: &S) -> BoundStatement
where
    S: sea_query::QueryStatementWriter,
{
    let (sql, values) = stmt.build(SqliteQueryBuilder);
    BoundStatement {
        sql,
        params: to_sqlite_values(values),
    }
}

fn to_sqlite_values(values: Values) -> Vec<SqlValue> {
    values.0.into_iter().map(to_sqlite_value).collect()
}

fn to_sqlite_value(value: Value) -> SqlValue {
    match value {
        Value::Bool(Some(b)) => SqlValue::Integer(i64::from(b)),
        Value::TinyInt(Some(v)) => SqlValue::Integer(i64::from(v)),
        Value::SmallInt(Some(v)) => SqlValue::Integer(i64::from(v)),
        Value::Int(Some(v)) => SqlValue::Integer(i64::from(v)),
        Value::BigInt(Some(v)) => SqlValue::Integer(v),
        Value::Double(Some(v)) => SqlValue::Real(v),
        Value::String(Some(s)) => SqlValue::Text(s.to_string()),
        _ => SqlValue::Null,
    }
}

/// Attach the statement text to a failed execution.
pub fn statement_error(sql: &str) -> impl FnOnce(rusqlite::Error) -> StoreError + '_ {
    move |source| StoreError::Statement {
        sql: sql.to_string(),
        source,
    }
}
