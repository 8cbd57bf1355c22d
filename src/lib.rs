pub mod charts;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod seasonality;
pub mod simulation;

pub use error::{Result, SeasonalityError};
