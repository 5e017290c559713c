//! dbmanager - run one parameterized query and print the rows as JSON.

use dbmanager::config::Config;
use dbmanager::DatabaseManager;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so stdout only carries the query result.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse_args();

    init_tracing(&config);

    let database = config.to_database()?;
    info!(
        db_type = %database.db_type(),
        host = %database.host(),
        database = %database.name(),
        "Starting dbmanager v{}",
        env!("CARGO_PKG_VERSION")
    );

    let mut manager = DatabaseManager::with_fetch_style(database, config.fetch_style.into())?;
    for attr in &config.attributes {
        manager.set_driver_attribute(attr.key.clone(), attr.value.clone());
    }

    let params = (!config.params.is_empty()).then_some(config.params.as_slice());
    let rows = match manager.query_once(&config.sql, params) {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "Query failed");
            return Err(e.into());
        }
    };

    let output = if config.pretty {
        serde_json::to_string_pretty(&rows)?
    } else {
        serde_json::to_string(&rows)?
    };
    println!("{}", output);

    Ok(())
}
