pub mod svg;

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::seasonality::SeasonalSeries;
use crate::simulation::{ManagedMoneyPoint, PositionPoint};
use svg::{BandArea, Chart, HorizontalGuide, LineSeries};

const SERIES_COLOR: &str = "#348dc1";
const LONG_COLOR: &str = "#2ca02c";
const SHORT_COLOR: &str = "#d62728";
const BAND_COLOR: &str = "grey";
const AVG_COLOR: &str = "orange";
const PRIOR_COLOR: &str = "#f2c80f"; // yellow
const CURRENT_COLOR: &str = "red";

const FIRST_WEEK: u32 = 1;
const LAST_WEEK: u32 = 52;

/// Raw simulated managed money series against dates
pub fn managed_money_chart(series: &[ManagedMoneyPoint], title: &str) -> String {
    let Some(origin) = series.first().map(|p| p.date) else {
        return empty_date_chart(title, "Value");
    };
    let last = series.last().map(|p| p.date).unwrap_or(origin);

    Chart {
        title,
        x_label: "Date",
        y_label: "Value",
        x_range: (0.0, day_offset(origin, last)),
        x_ticks: year_ticks(origin, last),
        bands: Vec::new(),
        lines: vec![LineSeries {
            label: None,
            color: SERIES_COLOR,
            stroke_width: 1.5,
            dash: false,
            points: series.iter().map(|p| (day_offset(origin, p.date), p.value)).collect(),
        }],
        guides: Vec::new(),
    }
    .render()
}

/// Long and short contract counts overlaid on a zero baseline
pub fn long_short_chart(positions: &[PositionPoint], commodity_name: &str) -> String {
    let title = format!("Long & Short Positions - {commodity_name}");
    let Some(origin) = positions.first().map(|p| p.date) else {
        return empty_date_chart(&title, "Contracts");
    };
    let last = positions.last().map(|p| p.date).unwrap_or(origin);

    let leg = |label: &str, color: &'static str, pick: fn(&PositionPoint) -> i64| LineSeries {
        label: Some(label.to_string()),
        color,
        stroke_width: 1.5,
        dash: false,
        points: positions
            .iter()
            .map(|p| (day_offset(origin, p.date), pick(p) as f64))
            .collect(),
    };

    Chart {
        title: &title,
        x_label: "Date",
        y_label: "Contracts",
        x_range: (0.0, day_offset(origin, last)),
        x_ticks: year_ticks(origin, last),
        bands: Vec::new(),
        lines: vec![
            leg("long", LONG_COLOR, |p| p.long_positions),
            leg("short", SHORT_COLOR, |p| p.short_positions),
        ],
        guides: vec![HorizontalGuide { value: 0.0, color: "black", width: 1.0 }],
    }
    .render()
}

/// Seasonal comparison: historical band, band average, prior year and current year by week
pub fn seasonal_chart(series: &SeasonalSeries) -> String {
    let title = format!("{} positions", series.metric);

    // Null weeks become NaN, which the renderer draws as a gap
    let band_max = series.band_max.iter().copied().collect::<BTreeMap<_, _>>();
    let band_points = series
        .band_min
        .iter()
        .filter_map(|(week, lower)| {
            band_max
                .get(week)
                .map(|upper| (*week as f64, lower.unwrap_or(f64::NAN), upper.unwrap_or(f64::NAN)))
        })
        .collect();

    let line = |label: String, color: &'static str, dash: bool, points: &[(u32, Option<f64>)]| LineSeries {
        label: Some(label),
        color,
        stroke_width: 3.0,
        dash,
        points: points
            .iter()
            .map(|(week, v)| (*week as f64, v.unwrap_or(f64::NAN)))
            .collect(),
    };

    Chart {
        title: &title,
        x_label: "Week number",
        y_label: series.metric.as_str(),
        x_range: (FIRST_WEEK as f64, LAST_WEEK as f64),
        x_ticks: week_ticks(),
        bands: vec![BandArea {
            label: Some("5Y Max / 5Y Min".to_string()),
            color: BAND_COLOR,
            opacity: 0.5,
            points: band_points,
        }],
        lines: vec![
            line("5Y Avg".to_string(), AVG_COLOR, true, &series.band_avg),
            line(series.prior_year.to_string(), PRIOR_COLOR, false, &series.prior),
            line(series.current_year.to_string(), CURRENT_COLOR, false, &series.current),
        ],
        guides: Vec::new(),
    }
    .render()
}

/// Write an SVG document to `dir/<name>.svg`
pub fn write_chart(dir: &Path, name: &str, svg: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.svg"));
    fs::write(&path, svg)?;
    info!(path = %path.display(), "Chart written");
    Ok(path)
}

fn empty_date_chart(title: &str, y_label: &str) -> String {
    Chart {
        title,
        x_label: "Date",
        y_label,
        x_range: (0.0, 0.0),
        x_ticks: Vec::new(),
        bands: Vec::new(),
        lines: Vec::new(),
        guides: Vec::new(),
    }
    .render()
}

fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

fn year_ticks(origin: NaiveDate, last: NaiveDate) -> Vec<(f64, String)> {
    (origin.year() + 1..=last.year())
        .filter_map(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        .map(|jan1| (day_offset(origin, jan1), jan1.year().to_string()))
        .collect()
}

fn week_ticks() -> Vec<(f64, String)> {
    (FIRST_WEEK..=LAST_WEEK)
        .filter(|week| *week == FIRST_WEEK || week % 4 == 0)
        .map(|week| (week as f64, week.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seasonality::Metric;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seasonal_series() -> SeasonalSeries {
        SeasonalSeries {
            metric: Metric::Net,
            current_year: 2023,
            prior_year: 2022,
            current: vec![(1, Some(10.0)), (2, Some(12.0))],
            prior: vec![(1, Some(8.0)), (2, Some(9.0)), (53, Some(4.0))],
            band_min: vec![(1, Some(5.0)), (2, Some(6.0))],
            band_max: vec![(1, Some(15.0)), (2, Some(16.0))],
            band_avg: vec![(1, Some(10.0)), (2, Some(11.0))],
        }
    }

    #[test]
    fn seasonal_chart_has_band_average_and_both_years() {
        let svg = seasonal_chart(&seasonal_series());

        assert!(svg.contains("net positions"));
        assert_eq!(svg.matches(r#"class="band""#).count(), 1);
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(svg.contains(r#"stroke="orange""#));
        assert!(svg.contains("stroke-dasharray=\"6 4\""));
        assert!(svg.contains(">2022<"));
        assert!(svg.contains(">2023<"));
        assert!(svg.contains("Week number"));
        assert!(svg.contains(">52<"));
    }

    #[test]
    fn null_week_breaks_seasonal_lines() {
        let series = SeasonalSeries {
            current: vec![(1, Some(10.0)), (2, None), (3, Some(11.0)), (4, Some(12.0))],
            prior: Vec::new(),
            band_min: vec![(1, Some(5.0)), (2, Some(6.0)), (3, None), (4, Some(7.0)), (5, Some(8.0))],
            band_max: vec![(1, Some(15.0)), (2, Some(16.0)), (3, None), (4, Some(17.0)), (5, Some(18.0))],
            band_avg: Vec::new(),
            ..seasonal_series()
        };
        let svg = seasonal_chart(&series);

        // Week 1 alone, then weeks 3-4
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert_eq!(svg.matches(r#"class="band""#).count(), 2);
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn long_short_chart_draws_zero_baseline() {
        let positions = vec![
            PositionPoint { date: date(2022, 12, 27), long_positions: 5, short_positions: -3 },
            PositionPoint { date: date(2023, 1, 3), long_positions: 6, short_positions: -4 },
        ];
        let svg = long_short_chart(&positions, "example_commodity");

        assert!(svg.contains("Long &amp; Short Positions - example_commodity"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(r#"stroke="black""#));
        assert!(svg.contains(">2023<"));
    }

    #[test]
    fn empty_series_render_placeholder() {
        assert!(managed_money_chart(&[], "managed_money").contains("No data"));
        assert!(long_short_chart(&[], "x").contains("No data"));
    }

    #[test]
    fn write_chart_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("charts");
        let svg = managed_money_chart(
            &[ManagedMoneyPoint { date: date(2023, 1, 3), value: 50.0 }, ManagedMoneyPoint { date: date(2023, 1, 10), value: 51.0 }],
            "managed_money",
        );

        let path = write_chart(&nested, "managed_money", &svg).unwrap();

        assert_eq!(path, nested.join("managed_money.svg"));
        assert_eq!(fs::read_to_string(path).unwrap(), svg);
    }
}
