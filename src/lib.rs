//! Minimal single-connection SQL helper.
//!
//! A [`Database`] holds the credentials, a [`DatabaseManager`] opens one
//! connection with them, runs parameterized queries and closes it again.
//! MySQL/MariaDB, PostgreSQL and SQLite are supported through sqlx.
//!
//! Statements use `?` placeholders on every backend. For PostgreSQL they are
//! renumbered to `$1..$n` before preparing; write `??` for a literal `?`.
//!
//! ```no_run
//! use dbmanager::{Database, DatabaseManager, QueryParam};
//!
//! # fn main() -> Result<(), dbmanager::DbError> {
//! let mut manager = DatabaseManager::new(Database::new("localhost", "u", "p", "testdb"))?;
//! manager.start()?;
//! let rows = manager.query("SELECT * FROM users WHERE id = ?", Some(&[QueryParam::Int(1)]))?;
//! manager.stop();
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::Config;
pub use db::DatabaseManager;
pub use error::{DbError, DbResult};
pub use models::{AttributeValue, Database, DatabaseType, DriverAttribute, FetchStyle, QueryParam};
