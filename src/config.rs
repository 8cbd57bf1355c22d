use chrono::{Datelike, NaiveDate};
use eyre::{Result, WrapErr, eyre};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::seasonality::AggregationWindow;
use crate::simulation::RandomWalkParams;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Run configuration. Defaults reproduce the example dataset.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub commodity_name: String,
    pub managed_money: RandomWalkParams,
    pub positions: RandomWalkParams,
    pub simulation_seed: Option<u64>, // Unset: non-reproducible thread RNG
    pub current_year: i32,
    pub lookback_years: i32,
    pub chart_output_dir: PathBuf,
}

impl Config {
    /// Load from the process environment. Binaries read `.env` before calling this.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let start_date = parse_date(&lookup, "SIM_START_DATE", "2012-01-03")?;
        let end_date = parse_date(&lookup, "SIM_END_DATE", "2023-06-13")?;
        if end_date < start_date {
            return Err(eyre!("SIM_END_DATE {end_date} is before SIM_START_DATE {start_date}"));
        }
        let inflation_rate = parse_finite(&lookup, "INFLATION_RATE", 0.02)?;

        let managed_money = RandomWalkParams {
            start_date,
            end_date,
            start_value: parse_finite(&lookup, "MM_START_VALUE", 50.0)?,
            mu: parse_finite(&lookup, "MM_MU", 0.04)?,
            st_dev: parse_finite(&lookup, "MM_ST_DEV", 2.0)?,
            inflation_rate,
        };

        let positions = RandomWalkParams {
            start_date,
            end_date,
            start_value: parse_finite(&lookup, "POS_START_VALUE", 0.0)?,
            mu: parse_finite(&lookup, "POS_MU", 0.0)?,
            st_dev: parse_finite(&lookup, "POS_ST_DEV", 5.0)?,
            inflation_rate,
        };

        let simulation_seed = lookup("SIMULATION_SEED")
            .map(|raw| raw.parse::<u64>().wrap_err_with(|| format!("Invalid SIMULATION_SEED: {raw}")))
            .transpose()?;

        let lookback_years = parse_or(&lookup, "LOOKBACK_YEARS", 5)?;
        if lookback_years < 1 {
            return Err(eyre!("LOOKBACK_YEARS must be at least 1, got {lookback_years}"));
        }

        Ok(Config {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://cot.db".to_string()),
            commodity_name: lookup("COMMODITY_NAME").unwrap_or_else(|| "example_commodity".to_string()),
            managed_money,
            positions,
            simulation_seed,
            current_year: parse_or(&lookup, "CURRENT_YEAR", end_date.year())?,
            lookback_years,
            chart_output_dir: lookup("CHART_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("charts")),
        })
    }

    pub fn aggregation_window(&self) -> AggregationWindow {
        AggregationWindow {
            current_year: self.current_year,
            lookback_years: self.lookback_years,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| eyre!("Invalid {key} value {raw:?}: {e}")),
        None => Ok(default),
    }
}

/// Like `parse_or`, but "nan" and "inf" are rejected
fn parse_finite<F>(lookup: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if !value.is_finite() {
        return Err(eyre!("{key} must be a finite number, got {value}"));
    }
    Ok(value)
}

fn parse_date<F>(lookup: &F, key: &str, default: &str) -> Result<NaiveDate>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .wrap_err_with(|| format!("Invalid {key} value {raw:?}, expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_example_dataset() {
        let cfg = config_from(&[]).unwrap();

        assert_eq!(cfg.managed_money.start_date, NaiveDate::from_ymd_opt(2012, 1, 3).unwrap());
        assert_eq!(cfg.managed_money.end_date, NaiveDate::from_ymd_opt(2023, 6, 13).unwrap());
        assert_eq!(cfg.managed_money.start_value, 50.0);
        assert_eq!(cfg.managed_money.mu, 0.04);
        assert_eq!(cfg.managed_money.st_dev, 2.0);
        assert_eq!(cfg.positions.st_dev, 5.0);
        assert_eq!(cfg.positions.inflation_rate, 0.02);
        assert_eq!(cfg.current_year, 2023);
        assert_eq!(cfg.lookback_years, 5);
        assert_eq!(cfg.simulation_seed, None);
        assert_eq!(cfg.database_url, "sqlite://cot.db");
        assert_eq!(cfg.chart_output_dir, PathBuf::from("charts"));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config_from(&[
            ("SIM_END_DATE", "2021-12-28"),
            ("MM_ST_DEV", "3.5"),
            ("SIMULATION_SEED", "42"),
            ("LOOKBACK_YEARS", "3"),
        ])
        .unwrap();

        assert_eq!(cfg.current_year, 2021);
        assert_eq!(cfg.managed_money.st_dev, 3.5);
        assert_eq!(cfg.simulation_seed, Some(42));
        assert_eq!(cfg.aggregation_window().first_year(), 2018);
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config_from(&[("MM_MU", "fast")]).unwrap_err();
        assert!(err.to_string().contains("MM_MU"));

        let err = config_from(&[("SIM_START_DATE", "03/01/2012")]).unwrap_err();
        assert!(err.to_string().contains("SIM_START_DATE"));
    }

    #[test]
    fn non_finite_walk_parameters_are_rejected() {
        for (key, raw) in [("MM_MU", "nan"), ("MM_START_VALUE", "inf"), ("INFLATION_RATE", "-inf")] {
            let err = config_from(&[(key, raw)]).unwrap_err();
            assert!(err.to_string().contains(key), "{key}={raw}: {err}");
        }
    }

    #[test]
    fn reversed_date_range_is_rejected() {
        let err = config_from(&[("SIM_START_DATE", "2024-01-02")]).unwrap_err();
        assert!(err.to_string().contains("before"));
    }
}
