use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::charts;
use crate::config::Config;
use crate::db::db_manager::DbManager;
use crate::error::{Result, SeasonalityError};
use crate::seasonality::{self, Metric, SeasonalSeries};
use crate::simulation;

/// What one pipeline run produced
#[derive(Debug)]
pub struct PipelineReport {
    pub simulated_weeks: usize,
    pub joined_records: usize,
    pub stored_records: u64,
    pub frame_rows: usize,
    pub charts: Vec<PathBuf>,
    pub export: PathBuf,
}

/// Simulate, store, aggregate and chart one commodity
#[instrument(name = "seasonality_pipeline", skip_all, fields(commodity = %config.commodity_name, on_close = true))]
pub async fn run(config: &Config) -> Result<PipelineReport> {
    let mut rng = match config.simulation_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    // Simulate
    let managed_money = simulation::simulate_managed_money(&config.managed_money, "managed_money", &mut rng)?;
    let positions =
        simulation::simulate_long_short_positions(&config.positions, &config.commodity_name, &mut rng)?;
    info!(
        managed_money = managed_money.len(),
        positions = positions.len(),
        "Simulated positioning series"
    );

    let out_dir = &config.chart_output_dir;
    let mut chart_paths = vec![
        charts::write_chart(out_dir, "managed_money", &charts::managed_money_chart(&managed_money, "managed_money"))?,
        charts::write_chart(out_dir, "long_short_positions", &charts::long_short_chart(&positions, &config.commodity_name))?,
    ];

    // Join and store
    let records = seasonality::join_on_date(&managed_money, &positions);
    if records.is_empty() {
        return Err(SeasonalityError::EmptySeries("joined positioning records".to_string()));
    }

    let db = DbManager::init(&config.database_url).await?;
    let stored_records = db.replace_records(&records).await?;

    // Aggregate from the store
    let stored = db.load_records().await?;
    let frame = seasonality::aggregate(&stored, config.aggregation_window());

    let series = Metric::ALL
        .iter()
        .map(|metric| seasonality::prepare_series(&frame, *metric, config.current_year))
        .collect::<Vec<SeasonalSeries>>();
    for s in &series {
        let path = charts::write_chart(out_dir, &format!("seasonal_{}", s.metric), &charts::seasonal_chart(s))?;
        chart_paths.push(path);
    }

    let export = seasonality::export::write_frame_json(out_dir, &frame, &series)?;

    Ok(PipelineReport {
        simulated_weeks: managed_money.len(),
        joined_records: records.len(),
        stored_records,
        frame_rows: frame.rows.len(),
        charts: chart_paths,
        export,
    })
}
