use dotenvy::dotenv;
use eyre::{Result, WrapErr};
use tracing::info;

use cot_seasonality::logging;
use cot_seasonality::config;
use cot_seasonality::db::db_manager::DbManager;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file, if present
    dotenv().ok();

    // Initialize logging
    if let Err(e) = logging::init_logging(env!("CARGO_BIN_NAME").to_string()) {
        eprintln!("Failed to initialize logging: {}", e);
        return Err(e);
    }

    // Load configuration
    let cfg = config::Config::load()?;
    info!(database_url = %cfg.database_url, "Configuration loaded and logging initialized");

    // Open the store
    let db = DbManager::init(&cfg.database_url)
        .await
        .wrap_err_with(|| format!("Failed to open {}", cfg.database_url))?;
    info!("Database connection pool created");

    // Create or replace the cot table
    db.replace_cot_table().await.wrap_err("Failed to replace cot table")?;
    info!("cot table created (any previous contents discarded)");

    Ok(())
}
