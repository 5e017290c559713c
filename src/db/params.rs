//! Parameter binding utilities for database queries.
//!
//! sqlx binds arguments in call order, so binding the slice front to back
//! places element `i` at placeholder position `i + 1`.

use crate::models::QueryParam;
use sqlx::mysql::MySqlArguments;
use sqlx::postgres::PgArguments;
use sqlx::sqlite::SqliteArguments;
use sqlx::{MySql, Postgres, Sqlite};
use std::borrow::Cow;

/// Bind a parameter to a MySQL query.
pub(crate) fn bind_mysql_param<'q>(
    query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    param: &'q QueryParam,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    match param {
        QueryParam::Null => query.bind(None::<String>),
        QueryParam::Bool(v) => query.bind(*v),
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::Float(v) => query.bind(*v),
        QueryParam::String(v) => query.bind(v.as_str()),
        QueryParam::Bytes(v) => query.bind(v.as_slice()),
    }
}

/// Bind a parameter to a PostgreSQL query.
pub(crate) fn bind_postgres_param<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    param: &'q QueryParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match param {
        QueryParam::Null => query.bind(None::<String>),
        QueryParam::Bool(v) => query.bind(*v),
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::Float(v) => query.bind(*v),
        QueryParam::String(v) => query.bind(v.as_str()),
        QueryParam::Bytes(v) => query.bind(v.as_slice()),
    }
}

/// Bind a parameter to a SQLite query.
pub(crate) fn bind_sqlite_param<'q>(
    query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    param: &'q QueryParam,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match param {
        QueryParam::Null => query.bind(None::<String>),
        QueryParam::Bool(v) => query.bind(*v),
        QueryParam::Int(v) => query.bind(*v),
        QueryParam::Float(v) => query.bind(*v),
        QueryParam::String(v) => query.bind(v.as_str()),
        QueryParam::Bytes(v) => query.bind(v.as_slice()),
    }
}

/// Rewrite `?` markers into PostgreSQL's numbered `$1..$n` placeholders.
///
/// Markers inside quoted strings, quoted identifiers, dollar-quoted bodies and
/// comments are copied unchanged. `??` stands for a literal `?`, which keeps
/// the jsonb `?`, `?|` and `?&` operators reachable.
pub(crate) fn rewrite_positional(sql: &str) -> Cow<'_, str> {
    if !sql.contains('?') {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut position = 0usize;
    let mut rest = sql;
    while let Some(c) = rest.chars().next() {
        let skip = match c {
            '\'' | '"' => quoted_len(rest, c),
            '-' if rest.starts_with("--") => rest.find('\n').map_or(rest.len(), |i| i + 1),
            '/' if rest.starts_with("/*") => rest[2..].find("*/").map_or(rest.len(), |i| i + 4),
            '$' => dollar_quoted_len(rest).unwrap_or(1),
            '?' if rest.starts_with("??") => {
                out.push('?');
                rest = &rest[2..];
                continue;
            }
            '?' => {
                position += 1;
                out.push('$');
                out.push_str(&position.to_string());
                rest = &rest[1..];
                continue;
            }
            _ => c.len_utf8(),
        };
        out.push_str(&rest[..skip]);
        rest = &rest[skip..];
    }
    Cow::Owned(out)
}

/// Length of the quoted run at the start of `s`, closing quote included.
///
/// A doubled quote is read as two adjacent runs.
fn quoted_len(s: &str, quote: char) -> usize {
    s[1..].find(quote).map_or(s.len(), |i| i + 2)
}

/// Length of the `$tag$ ... $tag$` body at the start of `s`, if it opens one.
fn dollar_quoted_len(s: &str) -> Option<usize> {
    let body = &s[1..];
    let tag_len = body
        .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .unwrap_or(body.len());
    if body.starts_with(|ch: char| ch.is_ascii_digit()) || !body[tag_len..].starts_with('$') {
        return None;
    }
    let delimiter = &s[..tag_len + 2];
    let end = s[delimiter.len()..]
        .find(delimiter)
        .map_or(s.len(), |i| i + delimiter.len() * 2);
    Some(end)
}

/// Trace each parameter with its 1-based placeholder position.
pub(crate) fn trace_params(params: &[QueryParam]) {
    for (idx, param) in params.iter().enumerate() {
        tracing::trace!(position = idx + 1, kind = param.type_name(), "Binding parameter");
    }
}
