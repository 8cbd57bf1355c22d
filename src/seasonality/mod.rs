pub mod aggregator;
pub mod export;
pub mod join;
pub mod reshape;
pub mod types;
pub mod week;

pub use aggregator::{AggregationWindow, SeasonalFrame, aggregate};
pub use join::join_on_date;
pub use reshape::{SeasonalSeries, prepare_series};
pub use types::{BandStats, DerivedRow, Metric, PositionRecord, SeasonalRow, WeeklyBand};
pub use week::week_number;
