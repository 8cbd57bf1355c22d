use chrono::NaiveDate;
use sqlx::FromRow;

use crate::seasonality::PositionRecord;

#[derive(Debug, FromRow)]
pub struct CotRowModel {
    pub managed_money: Option<f64>,
    pub date: NaiveDate,
    pub price: Option<f64>,
    pub long_positions: Option<i64>,
    pub short_positions: Option<i64>,
}

#[derive(Debug)]
pub struct NewCotRowModel {
    pub managed_money: f64,
    pub date: NaiveDate,
    pub price: Option<f64>, // Not simulated
    pub long_positions: i64,
    pub short_positions: i64,
}

impl From<&PositionRecord> for NewCotRowModel {
    fn from(record: &PositionRecord) -> Self {
        Self {
            managed_money: record.managed_money,
            date: record.date,
            price: None,
            long_positions: record.long_positions,
            short_positions: record.short_positions,
        }
    }
}

impl CotRowModel {
    /// None when any positioning column is NULL
    pub fn into_record(self) -> Option<PositionRecord> {
        Some(PositionRecord {
            date: self.date,
            managed_money: self.managed_money?,
            long_positions: self.long_positions?,
            short_positions: self.short_positions?,
        })
    }
}
