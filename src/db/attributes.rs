//! Driver attributes rendered as session statements.
//!
//! Each backend has its own way of changing a per-connection setting:
//! - MySQL: `SET SESSION key = value`
//! - PostgreSQL: `SET key = value`
//! - SQLite: `PRAGMA key = value`
//!
//! Statements run in insertion order on a freshly opened connection, so a
//! later attribute with the same key overrides an earlier one.

use crate::error::{DbError, DbResult};
use crate::models::{AttributeValue, DatabaseType, DriverAttribute};

/// Build the statement that applies `attr` on a `db_type` connection.
pub fn render_attribute(db_type: DatabaseType, attr: &DriverAttribute) -> DbResult<String> {
    validate_key(&attr.key)?;
    let value = render_value(db_type, &attr.value);

    Ok(match db_type {
        DatabaseType::MySQL => format!("SET SESSION {} = {}", attr.key, value),
        DatabaseType::PostgreSQL => format!("SET {} = {}", attr.key, value),
        DatabaseType::SQLite => format!("PRAGMA {} = {}", attr.key, value),
    })
}

/// Render every attribute up front so a bad key fails before anything runs.
pub fn render_all(db_type: DatabaseType, attrs: &[DriverAttribute]) -> DbResult<Vec<String>> {
    attrs
        .iter()
        .map(|attr| render_attribute(db_type, attr))
        .collect()
}

/// Keys are spliced into SQL, so only plain (optionally dotted) identifiers pass.
fn validate_key(key: &str) -> DbResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && !key.ends_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(DbError::invalid_input(format!(
            "Invalid driver attribute key: {:?}",
            key
        )))
    }
}

fn render_value(db_type: DatabaseType, value: &AttributeValue) -> String {
    match value {
        AttributeValue::Bool(v) => {
            let (on, off) = match db_type {
                DatabaseType::PostgreSQL => ("on", "off"),
                DatabaseType::MySQL | DatabaseType::SQLite => ("1", "0"),
            };
            let rendered = if *v { on } else { off };
            rendered.to_string()
        }
        AttributeValue::Int(v) => v.to_string(),
        AttributeValue::Str(s) => quote_literal(db_type, s),
    }
}

fn quote_literal(db_type: DatabaseType, s: &str) -> String {
    let mut escaped = s.replace('\'', "''");
    // MySQL also treats backslash as an escape character inside literals
    if db_type == DatabaseType::MySQL {
        escaped = escaped.replace('\\', "\\\\");
    }
    format!("'{}'", escaped)
}
