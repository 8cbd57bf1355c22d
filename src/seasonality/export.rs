use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::aggregator::SeasonalFrame;
use super::reshape::SeasonalSeries;
use super::types::SeasonalRow;
use crate::error::Result;

pub const FRAME_FILE_NAME: &str = "seasonal_frame.json";

#[derive(Serialize)]
struct FrameExport<'a> {
    current_year: i32,
    first_year: i32,
    columns: &'a [&'a str],
    rows: &'a [SeasonalRow],
    series: &'a [SeasonalSeries],
}

/// Write the aggregated frame and the reshaped series as pretty JSON into `dir`
pub fn write_frame_json(dir: &Path, frame: &SeasonalFrame, series: &[SeasonalSeries]) -> Result<PathBuf> {
    debug!(columns = ?SeasonalFrame::COLUMNS, "Seasonal frame columns");

    let export = FrameExport {
        current_year: frame.window.current_year,
        first_year: frame.window.first_year(),
        columns: &SeasonalFrame::COLUMNS,
        rows: &frame.rows,
        series,
    };

    fs::create_dir_all(dir)?;
    let path = dir.join(FRAME_FILE_NAME);
    fs::write(&path, serde_json::to_string_pretty(&export)?)?;

    info!(path = %path.display(), rows = frame.rows.len(), "Seasonal frame exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seasonality::aggregator::{AggregationWindow, aggregate};
    use crate::seasonality::reshape::prepare_series;
    use crate::seasonality::types::{Metric, PositionRecord};
    use chrono::NaiveDate;

    #[test]
    fn exported_json_carries_rows_and_bands() {
        let records = vec![
            PositionRecord {
                date: NaiveDate::from_ymd_opt(2022, 3, 8).unwrap(),
                managed_money: 20.0,
                long_positions: 50,
                short_positions: -10,
            },
            PositionRecord {
                date: NaiveDate::from_ymd_opt(2023, 3, 7).unwrap(),
                managed_money: 30.0,
                long_positions: 70,
                short_positions: 0,
            },
        ];
        let frame = aggregate(&records, AggregationWindow { current_year: 2023, lookback_years: 5 });
        let series = vec![prepare_series(&frame, Metric::Net, 2023)];

        let dir = tempfile::tempdir().unwrap();
        let path = write_frame_json(dir.path(), &frame, &series).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["current_year"], 2023);
        assert_eq!(json["first_year"], 2018);
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["rows"][0]["date"], "2022-03-08");
        assert_eq!(json["rows"][0]["net"], 40);
        assert_eq!(json["rows"][1]["ratio"], serde_json::Value::Null);
        assert_eq!(json["rows"][1]["band"]["net"]["avg"], 40.0);
        assert_eq!(json["series"][0]["metric"], "net");
    }
}
