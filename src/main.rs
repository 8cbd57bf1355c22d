use dotenvy::dotenv;
use eyre::WrapErr;
use tracing::{info, instrument};

use cot_seasonality::config;
use cot_seasonality::logging;
use cot_seasonality::pipeline;

#[instrument(name = "cot_seasonality_main")]
#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Load environment variables from .env file, if present
    dotenv().ok();

    // Initialize logging
    if let Err(e) = logging::init_logging(env!("CARGO_BIN_NAME").to_string()) {
        eprintln!("Failed to initialize logging: {}", e);
        return Err(e);
    }

    // Load configuration
    let cfg = config::Config::load()?;
    info!(
        commodity = %cfg.commodity_name,
        database_url = %cfg.database_url,
        current_year = cfg.current_year,
        lookback_years = cfg.lookback_years,
        seeded = cfg.simulation_seed.is_some(),
        "Configuration loaded and logging initialized"
    );

    // Run the pipeline once
    let report = pipeline::run(&cfg).await.wrap_err("Seasonality pipeline failed")?;
    info!(
        simulated_weeks = report.simulated_weeks,
        joined_records = report.joined_records,
        stored_records = report.stored_records,
        frame_rows = report.frame_rows,
        "Pipeline completed"
    );
    for chart in &report.charts {
        info!(path = %chart.display(), "Chart available");
    }
    info!(path = %report.export.display(), "Seasonal frame export available");

    Ok(())
}
