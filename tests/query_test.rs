//! Integration tests for query execution against SQLite.
//!
//! Tests verify that:
//! - Results round-trip under each fetch style
//! - Parameters bind to placeholders 1..n in order
//! - Driver failures surface as DbError::Driver

use dbmanager::{Database, DatabaseManager, DbError, FetchStyle, QueryParam};
use serde_json::json;

/// Start an in-memory database seeded with two users.
fn setup_users(style: FetchStyle) -> DatabaseManager {
    let mut manager = DatabaseManager::with_fetch_style(Database::sqlite(":memory:"), style).unwrap();
    manager.start().unwrap();
    manager
        .execute(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, score REAL)",
            None,
        )
        .unwrap();
    manager
        .execute(
            "INSERT INTO users (id, name, score) VALUES (?, ?, ?), (?, ?, ?)",
            Some(&[
                1.into(),
                "ada".into(),
                9.5.into(),
                2.into(),
                "grace".into(),
                QueryParam::Null,
            ]),
        )
        .unwrap();
    manager
}

#[test]
fn test_select_one_default_style() {
    let mut manager = DatabaseManager::new(Database::sqlite(":memory:")).unwrap();
    manager.start().unwrap();
    let rows = manager.query("SELECT 1", None).unwrap();
    assert_eq!(rows, vec![json!({"1": 1})]);
}

#[test]
fn test_round_trip_assoc() {
    let mut manager = setup_users(FetchStyle::Assoc);
    let rows = manager
        .query("SELECT id, name, score FROM users ORDER BY id", None)
        .unwrap();
    assert_eq!(
        rows,
        vec![
            json!({"id": 1, "name": "ada", "score": 9.5}),
            json!({"id": 2, "name": "grace", "score": null}),
        ]
    );
}

#[test]
fn test_assoc_keys_keep_select_order() {
    let mut manager = DatabaseManager::new(Database::sqlite(":memory:")).unwrap();
    let rows = manager.query_once("SELECT 2 AS b, 1 AS a", None).unwrap();
    assert_eq!(serde_json::to_string(&rows).unwrap(), r#"[{"b":2,"a":1}]"#);
}

#[test]
fn test_round_trip_num() {
    let mut manager = setup_users(FetchStyle::Num);
    let rows = manager
        .query("SELECT id, name, score FROM users ORDER BY id", None)
        .unwrap();
    assert_eq!(rows, vec![json!([1, "ada", 9.5]), json!([2, "grace", null])]);
}

#[test]
fn test_round_trip_both() {
    let mut manager = setup_users(FetchStyle::Both);
    let rows = manager
        .query("SELECT id, name FROM users WHERE id = ?", Some(&[2.into()]))
        .unwrap();
    assert_eq!(
        rows,
        vec![json!({"0": 2, "1": "grace", "id": 2, "name": "grace"})]
    );
}

#[test]
fn test_fetch_style_change_applies_to_next_query() {
    let mut manager = setup_users(FetchStyle::Assoc);
    let sql = "SELECT name FROM users WHERE id = 1";
    assert_eq!(manager.query(sql, None).unwrap(), vec![json!({"name": "ada"})]);

    manager.set_fetch_style(FetchStyle::Num);
    assert_eq!(manager.query(sql, None).unwrap(), vec![json!(["ada"])]);
}

#[test]
fn test_empty_result() {
    let mut manager = setup_users(FetchStyle::Assoc);
    let rows = manager
        .query("SELECT * FROM users WHERE id = ?", Some(&[99.into()]))
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_params_bind_in_order() {
    let mut manager = DatabaseManager::with_fetch_style(
        Database::sqlite(":memory:"),
        FetchStyle::Num,
    )
    .unwrap();
    manager.start().unwrap();

    // 10 - 3, not 3 - 10
    let rows = manager
        .query("SELECT ? - ?", Some(&[10.into(), 3.into()]))
        .unwrap();
    assert_eq!(rows, vec![json!([7])]);

    let rows = manager
        .query(
            "SELECT ? AS a, ? AS b, ? AS c",
            Some(&["first".into(), "second".into(), "third".into()]),
        )
        .unwrap();
    assert_eq!(rows, vec![json!(["first", "second", "third"])]);
}

#[test]
fn test_param_types() {
    let mut manager = DatabaseManager::new(Database::sqlite(":memory:")).unwrap();
    manager.start().unwrap();
    let rows = manager
        .query(
            "SELECT ? AS n, ? AS b, ? AS f, ? AS s, ? AS raw, ? AS nul",
            Some(&[
                QueryParam::Int(-42),
                QueryParam::Bool(true),
                QueryParam::Float(0.25),
                QueryParam::String("héllo".into()),
                QueryParam::Bytes(b"hi".to_vec()),
                QueryParam::Null,
            ]),
        )
        .unwrap();
    assert_eq!(
        rows,
        vec![json!({
            "n": -42,
            "b": 1,
            "f": 0.25,
            "s": "héllo",
            "raw": "aGk=",
            "nul": null,
        })]
    );
}

#[test]
fn test_none_and_empty_params_are_equivalent() {
    let mut manager = setup_users(FetchStyle::Assoc);
    let sql = "SELECT COUNT(*) AS n FROM users";
    let without = manager.query(sql, None).unwrap();
    let empty = manager.query(sql, Some(&[])).unwrap();
    assert_eq!(without, empty);
}

#[test]
fn test_execute_reports_rows_affected() {
    let mut manager = setup_users(FetchStyle::Assoc);
    let changed = manager
        .execute("UPDATE users SET score = ? WHERE score IS NULL", Some(&[1.0.into()]))
        .unwrap();
    assert_eq!(changed, 1);

    let changed = manager.execute("DELETE FROM users", None).unwrap();
    assert_eq!(changed, 2);
}

#[test]
fn test_nonexistent_table_is_driver_error() {
    let mut manager = DatabaseManager::new(Database::sqlite(":memory:")).unwrap();
    manager.set_driver_attribute("foreign_keys", true);
    manager.start().unwrap();

    let err = manager
        .query("SELECT * FROM nonexistent_table", None)
        .unwrap_err();
    assert!(matches!(err, DbError::Driver(sqlx::Error::Database(_))));
    assert!(err.to_string().contains("nonexistent_table"));

    // The connection stays usable after a failed statement
    assert!(manager.query("SELECT 1", None).is_ok());
}

#[test]
fn test_malformed_sql_is_driver_error() {
    let mut manager = DatabaseManager::new(Database::sqlite(":memory:")).unwrap();
    manager.start().unwrap();
    let result = manager.query("SELEKT nothing", None);
    assert!(matches!(result, Err(DbError::Driver(_))));
}

#[test]
fn test_constraint_violation_has_sql_state() {
    let mut manager = setup_users(FetchStyle::Assoc);
    let err = manager
        .execute(
            "INSERT INTO users (id, name) VALUES (?, ?)",
            Some(&[1.into(), "duplicate".into()]),
        )
        .unwrap_err();
    assert!(err.driver_error().is_some());
    assert!(err.sql_state().is_some());
}
