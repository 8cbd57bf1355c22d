use sqlx::ConnectOptions;
use sqlx::sqlite::{
    SqliteConnectOptions,
    SqlitePool,
    SqlitePoolOptions,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::log::LevelFilter;

/// Single-connection pool on the SQLite file behind `database_url`, created if missing
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .log_slow_statements(LevelFilter::Warn, Duration::from_secs(60));

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
}
