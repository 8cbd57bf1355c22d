use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeasonalityError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid distribution for series {series}: {source}")]
    InvalidDistribution {
        series: String,
        #[source]
        source: rand_distr::NormalError,
    },

    #[error("invalid {parameter} for series {series}: {value} is not finite")]
    NonFiniteParameter {
        series: String,
        parameter: &'static str,
        value: f64,
    },

    #[error("series {0} is empty")]
    EmptySeries(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SeasonalityError>;
