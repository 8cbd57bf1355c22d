use serde::Serialize;

use super::aggregator::SeasonalFrame;
use super::types::{BandStats, Metric};

/// Per-metric series ready for a banded seasonal chart, keyed by week number.
/// Null values stay in place as `None` so charts can leave a gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalSeries {
    pub metric: Metric,
    pub current_year: i32,
    pub prior_year: i32,
    pub current: Vec<(u32, Option<f64>)>,
    pub prior: Vec<(u32, Option<f64>)>,
    pub band_min: Vec<(u32, Option<f64>)>,
    pub band_max: Vec<(u32, Option<f64>)>,
    pub band_avg: Vec<(u32, Option<f64>)>,
}

impl SeasonalSeries {
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.prior.is_empty() && self.band_avg.is_empty()
    }
}

/// Split the frame into current-year, prior-year and band series for one metric.
///
/// The band is read from the prior year's rows, so it follows the prior
/// year's week axis rather than the current year's.
pub fn prepare_series(frame: &SeasonalFrame, metric: Metric, current_year: i32) -> SeasonalSeries {
    let prior_year = current_year - 1;

    let current = frame
        .rows_for_year(current_year)
        .map(|r| (r.row.week_number, r.row.value(metric)))
        .collect();

    let prior_rows = frame.rows_for_year(prior_year).collect::<Vec<_>>();
    let prior = prior_rows
        .iter()
        .map(|r| (r.row.week_number, r.row.value(metric)))
        .collect();

    let band_series = |pick: fn(&BandStats) -> Option<f64>| -> Vec<(u32, Option<f64>)> {
        prior_rows
            .iter()
            .map(|r| (r.row.week_number, r.band.as_ref().and_then(|band| pick(band.stats(metric)))))
            .collect()
    };

    SeasonalSeries {
        metric,
        current_year,
        prior_year,
        current,
        prior,
        band_min: band_series(|s| s.min),
        band_max: band_series(|s| s.max),
        band_avg: band_series(|s| s.avg),
    }
}
