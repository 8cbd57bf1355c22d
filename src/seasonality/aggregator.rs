use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

use super::types::{BandStats, DerivedRow, PositionRecord, SeasonalRow, WeeklyBand};

/// Which rows are compared: the current year against the `lookback_years` before it.
/// Years after `current_year` are outside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationWindow {
    pub current_year: i32,
    pub lookback_years: i32,
}

impl AggregationWindow {
    pub fn first_year(&self) -> i32 {
        self.current_year - self.lookback_years
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.first_year()..=self.current_year).contains(&year)
    }

    pub fn is_historical(&self, year: i32) -> bool {
        self.contains(year) && year != self.current_year
    }
}

/// Window rows joined with their week's historical band, ordered by date
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalFrame {
    pub window: AggregationWindow,
    pub rows: Vec<SeasonalRow>,
    pub bands: BTreeMap<u32, WeeklyBand>,
}

impl SeasonalFrame {
    pub const COLUMNS: [&'static str; 17] = [
        "date",
        "managed_money",
        "long_positions",
        "short_positions",
        "year",
        "week_number",
        "net",
        "ratio",
        "max_net",
        "min_net",
        "avg_net",
        "max_ratio",
        "min_ratio",
        "avg_ratio",
        "max_managed_money",
        "min_managed_money",
        "avg_managed_money",
    ];

    /// Rows whose week has historical support; weeks without it are dropped
    pub fn inner_joined(&self) -> impl Iterator<Item = &SeasonalRow> {
        self.rows.iter().filter(|row| row.band.is_some())
    }

    pub fn rows_for_year(&self, year: i32) -> impl Iterator<Item = &SeasonalRow> {
        self.rows.iter().filter(move |row| row.row.year == year)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the seasonal frame: window filter, per-row metrics, per-week bands, join.
#[instrument(name = "aggregate_seasonal_frame", skip(records), fields(records = records.len(), on_close = true))]
pub fn aggregate(records: &[PositionRecord], window: AggregationWindow) -> SeasonalFrame {
    let rows = window_rows(records, window);
    let bands = weekly_bands(&rows, window);

    let rows = rows
        .into_iter()
        .map(|row| SeasonalRow {
            band: bands.get(&row.week_number).copied(),
            row,
        })
        .collect::<Vec<_>>();

    let unsupported = rows.iter().filter(|row| row.band.is_none()).count();
    if unsupported > 0 {
        debug!(unsupported, "Rows without historical band support");
    }
    info!(
        rows = rows.len(),
        weeks = bands.len(),
        first_year = window.first_year(),
        current_year = window.current_year,
        "Seasonal frame aggregated"
    );

    SeasonalFrame { window, rows, bands }
}

/// Derived rows inside the window, ordered by date, identical rows collapsed
pub fn window_rows(records: &[PositionRecord], window: AggregationWindow) -> Vec<DerivedRow> {
    let mut rows = records
        .iter()
        .copied()
        .map(DerivedRow::from_record)
        .filter(|row| window.contains(row.year))
        .collect::<Vec<_>>();

    rows.sort_by(|a, b| {
        a.record
            .date
            .cmp(&b.record.date)
            .then_with(|| a.record.long_positions.cmp(&b.record.long_positions))
            .then_with(|| a.record.short_positions.cmp(&b.record.short_positions))
            .then_with(|| a.record.managed_money.total_cmp(&b.record.managed_money))
    });
    rows.dedup();
    rows
}

/// Min/max/avg per week number over the historical (non-current) years of the window
pub fn weekly_bands(rows: &[DerivedRow], window: AggregationWindow) -> BTreeMap<u32, WeeklyBand> {
    let mut accumulators: BTreeMap<u32, WeekAccumulator> = BTreeMap::new();
    for row in rows.iter().filter(|row| window.is_historical(row.year)) {
        let acc = accumulators.entry(row.week_number).or_default();
        acc.net.push(Some(row.net as f64));
        acc.ratio.push(row.ratio);
        acc.managed_money.push(Some(row.record.managed_money));
    }

    accumulators
        .into_iter()
        .map(|(week_number, acc)| {
            let band = WeeklyBand {
                week_number,
                net: acc.net.finish(),
                ratio: acc.ratio.finish(),
                managed_money: acc.managed_money.finish(),
            };
            (week_number, band)
        })
        .collect()
}

#[derive(Default)]
struct WeekAccumulator {
    net: StatsAccumulator,
    ratio: StatsAccumulator,
    managed_money: StatsAccumulator,
}

/// Null-skipping running min/max/sum, like SQL aggregates
#[derive(Default)]
struct StatsAccumulator {
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    count: usize,
}

impl StatsAccumulator {
    fn push(&mut self, value: Option<f64>) {
        let Some(value) = value else { return };
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value;
        self.count += 1;
    }

    fn finish(self) -> BandStats {
        BandStats {
            min: self.min,
            max: self.max,
            avg: (self.count > 0).then(|| self.sum / self.count as f64),
        }
    }
}
