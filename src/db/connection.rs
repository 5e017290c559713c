//! Single driver connection.
//!
//! This module wraps one database-specific sqlx connection (no pool) and
//! exposes the primitives the manager needs: connect, apply a session
//! statement, run a query, close.

use crate::db::attributes::render_all;
use crate::db::params::{
    bind_mysql_param, bind_postgres_param, bind_sqlite_param, rewrite_positional, trace_params,
};
use crate::db::types::shape_rows;
use crate::error::DbResult;
use crate::models::{Database, DatabaseType, DriverAttribute, FetchStyle, QueryParam};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Executor};
use tracing::{debug, info, warn};

const SQLITE_MEMORY: &str = ":memory:";

/// Database-specific connection.
#[derive(Debug)]
pub enum DbConnection {
    MySql(MySqlConnection),
    Postgres(PgConnection),
    SQLite(SqliteConnection),
}

impl DbConnection {
    /// Open a connection for `database` and apply `attributes` in order.
    ///
    /// Attribute keys are checked before the handshake, so a bad key never
    /// leaves a half-configured connection behind.
    pub async fn open(database: &Database, attributes: &[DriverAttribute]) -> DbResult<Self> {
        let statements = render_all(database.db_type(), attributes)?;

        let mut conn = Self::connect(database).await?;
        info!(
            db_type = %database.db_type(),
            host = %database.host(),
            database = %database.name(),
            "Connected"
        );

        for statement in &statements {
            debug!(statement = %statement, "Applying driver attribute");
            if let Err(e) = conn.execute_raw(statement).await {
                conn.close().await;
                return Err(e);
            }
        }

        Ok(conn)
    }

    async fn connect(database: &Database) -> DbResult<Self> {
        match database.db_type() {
            DatabaseType::MySQL => {
                let (host, port) = database.host_and_port();
                let mut options = MySqlConnectOptions::new()
                    .host(host)
                    .username(database.username())
                    .password(database.password())
                    .database(database.name())
                    .charset("utf8mb4");
                if let Some(port) = port {
                    options = options.port(port);
                }
                Ok(Self::MySql(options.connect().await?))
            }
            DatabaseType::PostgreSQL => {
                let (host, port) = database.host_and_port();
                let mut options = PgConnectOptions::new()
                    .host(host)
                    .username(database.username())
                    .password(database.password())
                    .database(database.name());
                if let Some(port) = port {
                    options = options.port(port);
                }
                Ok(Self::Postgres(options.connect().await?))
            }
            DatabaseType::SQLite => {
                // The name is a filesystem path, never a connection URL
                let options = SqliteConnectOptions::new()
                    .filename(database.name())
                    .in_memory(database.name() == SQLITE_MEMORY)
                    .create_if_missing(true);
                Ok(Self::SQLite(options.connect().await?))
            }
        }
    }

    /// Get the database type for this connection.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbConnection::MySql(_) => DatabaseType::MySQL,
            DbConnection::Postgres(_) => DatabaseType::PostgreSQL,
            DbConnection::SQLite(_) => DatabaseType::SQLite,
        }
    }

    /// Run a statement without preparing it.
    async fn execute_raw(&mut self, sql: &str) -> DbResult<u64> {
        let rows_affected = match self {
            DbConnection::MySql(c) => c.execute(sql).await?.rows_affected(),
            DbConnection::Postgres(c) => c.execute(sql).await?.rows_affected(),
            DbConnection::SQLite(c) => c.execute(sql).await?.rows_affected(),
        };
        Ok(rows_affected)
    }

    /// Prepare `sql`, bind `params` positionally, execute and fetch every row.
    pub async fn fetch_all(
        &mut self,
        sql: &str,
        params: &[QueryParam],
        style: FetchStyle,
    ) -> DbResult<Vec<JsonValue>> {
        trace_params(params);
        let rows = match self {
            DbConnection::MySql(c) => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = bind_mysql_param(query, param);
                }
                shape_rows(&query.fetch_all(&mut *c).await?, style)
            }
            DbConnection::Postgres(c) => {
                let sql = rewrite_positional(sql);
                let mut query = sqlx::query(&sql);
                for param in params {
                    query = bind_postgres_param(query, param);
                }
                shape_rows(&query.fetch_all(&mut *c).await?, style)
            }
            DbConnection::SQLite(c) => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = bind_sqlite_param(query, param);
                }
                shape_rows(&query.fetch_all(&mut *c).await?, style)
            }
        };
        Ok(rows)
    }

    /// Prepare `sql`, bind `params` positionally, execute and report affected rows.
    pub async fn execute(&mut self, sql: &str, params: &[QueryParam]) -> DbResult<u64> {
        trace_params(params);
        let rows_affected = match self {
            DbConnection::MySql(c) => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = bind_mysql_param(query, param);
                }
                query.execute(&mut *c).await?.rows_affected()
            }
            DbConnection::Postgres(c) => {
                let sql = rewrite_positional(sql);
                let mut query = sqlx::query(&sql);
                for param in params {
                    query = bind_postgres_param(query, param);
                }
                query.execute(&mut *c).await?.rows_affected()
            }
            DbConnection::SQLite(c) => {
                let mut query = sqlx::query(sql);
                for param in params {
                    query = bind_sqlite_param(query, param);
                }
                query.execute(&mut *c).await?.rows_affected()
            }
        };
        Ok(rows_affected)
    }

    /// Close the connection gracefully. Failures are logged, not returned.
    pub async fn close(self) {
        let db_type = self.db_type();
        let result = match self {
            DbConnection::MySql(c) => c.close().await,
            DbConnection::Postgres(c) => c.close().await,
            DbConnection::SQLite(c) => c.close().await,
        };
        match result {
            Ok(()) => info!(db_type = %db_type, "Connection closed"),
            Err(e) => warn!(db_type = %db_type, error = %e, "Failed to close connection cleanly"),
        }
    }
}
