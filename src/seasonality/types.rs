use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

use super::week::week_number;

/// One weekly positioning observation for one instrument
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionRecord {
    pub date: NaiveDate,
    pub managed_money: f64,
    pub long_positions: i64,
    pub short_positions: i64, // Stored negative
}

/// A record with its per-row derived columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedRow {
    #[serde(flatten)]
    pub record: PositionRecord,
    pub year: i32,
    pub week_number: u32,
    pub net: i64,
    pub ratio: Option<f64>, // None when short_positions == 0
}

impl DerivedRow {
    pub fn from_record(record: PositionRecord) -> Self {
        let ratio = if record.short_positions == 0 {
            None
        } else {
            Some(record.long_positions as f64 / record.short_positions.unsigned_abs() as f64)
        };

        Self {
            record,
            year: record.date.year(),
            week_number: week_number(record.date),
            net: record.long_positions + record.short_positions,
            ratio,
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Net => Some(self.net as f64),
            Metric::Ratio => self.ratio,
            Metric::ManagedMoney => Some(self.record.managed_money),
        }
    }
}

/// Min/max/avg of one metric across historical years; None when no inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BandStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

/// Historical envelope for a single week number
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyBand {
    pub week_number: u32,
    pub net: BandStats,
    pub ratio: BandStats,
    pub managed_money: BandStats,
}

impl WeeklyBand {
    pub fn stats(&self, metric: Metric) -> &BandStats {
        match metric {
            Metric::Net => &self.net,
            Metric::Ratio => &self.ratio,
            Metric::ManagedMoney => &self.managed_money,
        }
    }
}

/// A row of the trailing window joined with the band of its week
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonalRow {
    #[serde(flatten)]
    pub row: DerivedRow,
    pub band: Option<WeeklyBand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Net,
    Ratio,
    ManagedMoney,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Net, Metric::Ratio, Metric::ManagedMoney];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Net => "net",
            Metric::Ratio => "ratio",
            Metric::ManagedMoney => "managed_money",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
