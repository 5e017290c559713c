//! Blocking single-connection manager.
//!
//! `DatabaseManager` owns one `Database` and at most one live connection.
//! Every call blocks the current thread until the driver round trip is done;
//! internally the sqlx futures are driven on a private current-thread tokio
//! runtime, so the manager must not be used from inside another runtime.
//!
//! # Lifecycle
//!
//! ```text
//!              start()                 stop()
//! Disconnected ───────▶ Connected ───────────▶ Disconnected
//!                       │  ▲   │
//!                       └──┘   └── query() / execute()
//!                      start() closes the old connection first
//! ```

use crate::db::connection::DbConnection;
use crate::error::{DbError, DbResult};
use crate::models::{AttributeValue, Database, DriverAttribute, FetchStyle, QueryParam};
use serde_json::Value as JsonValue;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Opens a connection, runs parameterized queries on it, closes it.
pub struct DatabaseManager {
    database: Database,
    // Declared before `runtime` so it is dropped while the runtime is alive.
    connection: Option<DbConnection>,
    attributes: Vec<DriverAttribute>,
    fetch_style: FetchStyle,
    runtime: Runtime,
}

impl DatabaseManager {
    /// Create a manager using the default fetch style.
    pub fn new(database: Database) -> DbResult<Self> {
        Self::with_fetch_style(database, FetchStyle::default())
    }

    /// Create a manager with an explicit fetch style.
    pub fn with_fetch_style(database: Database, fetch_style: FetchStyle) -> DbResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DbError::Runtime)?;

        Ok(Self {
            database,
            connection: None,
            attributes: Vec::new(),
            fetch_style,
            runtime,
        })
    }

    /// Replace the credentials. An open connection keeps using the old ones
    /// until the next `start()`.
    pub fn set_database(&mut self, database: Database) {
        self.database = database;
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Append a driver attribute. It takes effect on the next `start()`.
    ///
    /// Keys are not deduplicated; attributes are applied in the order they
    /// were added, so the last value for a key wins.
    pub fn set_driver_attribute(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.push(DriverAttribute::new(key, value));
    }

    /// Attributes in the order they were added.
    pub fn driver_attributes(&self) -> &[DriverAttribute] {
        &self.attributes
    }

    pub fn set_fetch_style(&mut self, fetch_style: FetchStyle) {
        self.fetch_style = fetch_style;
    }

    pub fn fetch_style(&self) -> FetchStyle {
        self.fetch_style
    }

    /// Check whether a connection is currently held.
    pub fn is_started(&self) -> bool {
        self.connection.is_some()
    }

    /// Open a connection and apply the configured driver attributes.
    ///
    /// A connection that is already open is closed first. If opening fails
    /// the manager is left disconnected.
    pub fn start(&mut self) -> DbResult<()> {
        if let Some(previous) = self.connection.take() {
            debug!("start() called while connected, closing previous connection");
            self.runtime.block_on(previous.close());
        }

        let connection = self
            .runtime
            .block_on(DbConnection::open(&self.database, &self.attributes))?;
        self.connection = Some(connection);
        Ok(())
    }

    /// Run `sql` and return every result row shaped by the fetch style.
    ///
    /// `params` bind to the statement's `?` placeholders in order: element `i`
    /// goes to position `i + 1`. On PostgreSQL the markers are renumbered to
    /// `$1..$n` outside literals and comments, and `??` stands for a literal
    /// `?`. Fails with `DbError::NotStarted` when no connection is open.
    pub fn query(&mut self, sql: &str, params: Option<&[QueryParam]>) -> DbResult<Vec<JsonValue>> {
        let connection = self.connection.as_mut().ok_or(DbError::NotStarted)?;
        debug!(
            sql = %sql,
            params = params.map_or(0, <[QueryParam]>::len),
            fetch_style = %self.fetch_style,
            "Executing query"
        );
        let rows = self.runtime.block_on(connection.fetch_all(
            sql,
            params.unwrap_or_default(),
            self.fetch_style,
        ))?;
        debug!(rows = rows.len(), "Query finished");
        Ok(rows)
    }

    /// Run a statement that returns no rows and report how many rows it changed.
    ///
    /// Placeholders bind the same way as in [`query`](Self::query).
    pub fn execute(&mut self, sql: &str, params: Option<&[QueryParam]>) -> DbResult<u64> {
        let connection = self.connection.as_mut().ok_or(DbError::NotStarted)?;
        debug!(
            sql = %sql,
            params = params.map_or(0, <[QueryParam]>::len),
            "Executing statement"
        );
        self.runtime
            .block_on(connection.execute(sql, params.unwrap_or_default()))
    }

    /// `start()`, `query()`, `stop()` in one call.
    ///
    /// The connection is stopped whether or not the query succeeds. Meant for
    /// single-query sessions; every call opens a new connection.
    pub fn query_once(
        &mut self,
        sql: &str,
        params: Option<&[QueryParam]>,
    ) -> DbResult<Vec<JsonValue>> {
        self.start()?;
        let result = self.query(sql, params);
        self.stop();
        result
    }

    /// Close the connection, if any. Calling it again is a no-op.
    pub fn stop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.runtime.block_on(connection.close());
        }
    }
}

impl Drop for DatabaseManager {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for DatabaseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseManager")
            .field("database", &self.database)
            .field("started", &self.is_started())
            .field("attributes", &self.attributes)
            .field("fetch_style", &self.fetch_style)
            .finish_non_exhaustive()
    }
}
