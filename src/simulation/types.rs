use chrono::NaiveDate;
use serde::Serialize;

/// Parameters of one Gaussian random walk sampled every 7 days.
///
/// Each step adds `Normal(mu, st_dev) * (1 + inflation_rate / 52)` to the
/// running value.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomWalkParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate, // Inclusive
    pub start_value: f64,
    pub mu: f64,
    pub st_dev: f64,
    pub inflation_rate: f64, // Annualized, applied weekly
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ManagedMoneyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionPoint {
    pub date: NaiveDate,
    pub long_positions: i64,  // Always >= 0
    pub short_positions: i64, // Always <= 0
}
