use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, trace};

use super::types::{ManagedMoneyPoint, PositionPoint, RandomWalkParams};
use crate::error::{Result, SeasonalityError};

const WEEKS_PER_YEAR: f64 = 52.0;
const STEP_DAYS: i64 = 7;

/// Simulate a managed money series: a Gaussian random walk reflected at zero
pub fn simulate_managed_money<R: Rng + ?Sized>(
    params: &RandomWalkParams,
    series_name: &str,
    rng: &mut R,
) -> Result<Vec<ManagedMoneyPoint>> {
    let dates = weekly_dates(params.start_date, params.end_date)?;
    let mut walk = RandomWalk::new(params, series_name)?;

    let series = dates
        .into_iter()
        .map(|date| {
            let value = walk.step(rng);
            ManagedMoneyPoint { date, value: value.abs() }
        })
        .collect::<Vec<_>>();

    debug!(series = series_name, points = series.len(), "Simulated managed money series");
    Ok(series)
}

/// Simulate long and short contract counts as two independent integer walks
pub fn simulate_long_short_positions<R: Rng + ?Sized>(
    params: &RandomWalkParams,
    series_name: &str,
    rng: &mut R,
) -> Result<Vec<PositionPoint>> {
    let dates = weekly_dates(params.start_date, params.end_date)?;

    // Long leg is walked to completion before the short leg, as two separate passes
    let mut long_walk = RandomWalk::new(params, series_name)?;
    let longs = dates
        .iter()
        .map(|_| long_walk.step_rounded(rng).abs() as i64)
        .collect::<Vec<_>>();

    let mut short_walk = RandomWalk::new(params, series_name)?;
    let shorts = dates
        .iter()
        .map(|_| -(short_walk.step_rounded(rng).abs() as i64))
        .collect::<Vec<_>>();

    let series = dates
        .into_iter()
        .zip(longs.into_iter().zip(shorts))
        .map(|(date, (long_positions, short_positions))| PositionPoint {
            date,
            long_positions,
            short_positions,
        })
        .collect::<Vec<_>>();

    debug!(series = series_name, points = series.len(), "Simulated long/short positions");
    Ok(series)
}

/// Every 7th day from `start` up to and including `end`
pub fn weekly_dates(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
    if end < start {
        return Err(SeasonalityError::InvalidDateRange { start, end });
    }

    let n_steps = (end - start).num_days() / STEP_DAYS + 1;
    Ok((0..n_steps)
        .map(|i| start + Duration::days(i * STEP_DAYS))
        .collect())
}

struct RandomWalk<'a> {
    series_name: &'a str,
    value: f64,
    step_scale: f64,
    normal: Normal<f64>,
}

impl<'a> RandomWalk<'a> {
    fn new(params: &RandomWalkParams, series_name: &'a str) -> Result<Self> {
        // `Normal::new` already rejects a non-finite st_dev
        for (parameter, value) in [
            ("start_value", params.start_value),
            ("mu", params.mu),
            ("inflation_rate", params.inflation_rate),
        ] {
            if !value.is_finite() {
                return Err(SeasonalityError::NonFiniteParameter {
                    series: series_name.to_string(),
                    parameter,
                    value,
                });
            }
        }

        let normal = Normal::new(params.mu, params.st_dev).map_err(|source| {
            SeasonalityError::InvalidDistribution {
                series: series_name.to_string(),
                source,
            }
        })?;

        Ok(Self {
            series_name,
            value: params.start_value,
            step_scale: 1.0 + params.inflation_rate / WEEKS_PER_YEAR,
            normal,
        })
    }

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let delta = self.normal.sample(rng) * self.step_scale;
        trace!(series = self.series_name, delta, "Random walk step");
        self.value += delta;
        self.value
    }

    /// Contract counts are whole numbers, rounded half to even after each step
    fn step_rounded<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        self.step(rng);
        self.value = self.value.round_ties_even();
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn managed_money_params() -> RandomWalkParams {
        RandomWalkParams {
            start_date: date(2012, 1, 3),
            end_date: date(2023, 6, 13),
            start_value: 50.0,
            mu: 0.04,
            st_dev: 2.0,
            inflation_rate: 0.02,
        }
    }

    #[test]
    fn weekly_dates_include_end_when_aligned() {
        let dates = weekly_dates(date(2023, 1, 3), date(2023, 1, 17)).unwrap();
        assert_eq!(dates, vec![date(2023, 1, 3), date(2023, 1, 10), date(2023, 1, 17)]);
    }

    #[test]
    fn weekly_dates_single_day_range() {
        let dates = weekly_dates(date(2023, 1, 3), date(2023, 1, 3)).unwrap();
        assert_eq!(dates, vec![date(2023, 1, 3)]);
    }

    #[test]
    fn weekly_dates_reject_reversed_range() {
        let err = weekly_dates(date(2023, 1, 10), date(2023, 1, 3)).unwrap_err();
        assert!(matches!(err, SeasonalityError::InvalidDateRange { .. }));
    }

    #[test]
    fn managed_money_has_one_point_per_week_and_stays_non_negative() {
        let mut rng = StdRng::seed_from_u64(7);
        let series = simulate_managed_money(&managed_money_params(), "managed_money", &mut rng).unwrap();

        assert_eq!(series.len(), 598);
        assert_eq!(series[0].date, date(2012, 1, 3));
        assert!((series[0].value - 50.0).abs() < 10.0, "first value {}", series[0].value);
        assert!(series.iter().all(|p| p.value >= 0.0));
        assert!(series.windows(2).all(|w| (w[1].date - w[0].date).num_days() == 7));
    }

    #[test]
    fn managed_money_reflects_at_zero() {
        let params = RandomWalkParams {
            start_value: 0.0,
            mu: -5.0,
            st_dev: 1.0,
            ..managed_money_params()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let series = simulate_managed_money(&params, "managed_money", &mut rng).unwrap();

        assert!(series.iter().all(|p| p.value >= 0.0));
        // Strong negative drift: the underlying walk is far below zero by the end
        assert!(series.last().unwrap().value > 100.0);
    }

    #[test]
    fn positions_have_signed_integer_legs() {
        let params = RandomWalkParams {
            start_value: 0.0,
            mu: 0.0,
            st_dev: 5.0,
            ..managed_money_params()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let series = simulate_long_short_positions(&params, "example_commodity", &mut rng).unwrap();

        assert_eq!(series.len(), 598);
        assert!(series.iter().all(|p| p.long_positions >= 0));
        assert!(series.iter().all(|p| p.short_positions <= 0));
    }

    #[test]
    fn seeded_simulation_is_reproducible() {
        let params = managed_money_params();
        let a = simulate_managed_money(&params, "mm", &mut StdRng::seed_from_u64(42)).unwrap();
        let b = simulate_managed_money(&params, "mm", &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_standard_deviation_is_rejected() {
        let params = RandomWalkParams {
            st_dev: -1.0,
            ..managed_money_params()
        };
        let err = simulate_managed_money(&params, "mm", &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, SeasonalityError::InvalidDistribution { .. }));
    }

    #[test]
    fn non_finite_drift_is_rejected() {
        let params = RandomWalkParams {
            mu: f64::NAN,
            ..managed_money_params()
        };
        let err = simulate_managed_money(&params, "mm", &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, SeasonalityError::NonFiniteParameter { parameter: "mu", .. }));
    }

    #[test]
    fn non_finite_start_or_inflation_is_rejected() {
        let params = RandomWalkParams {
            start_value: f64::INFINITY,
            ..managed_money_params()
        };
        let err = simulate_long_short_positions(&params, "pos", &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, SeasonalityError::NonFiniteParameter { parameter: "start_value", .. }));

        let params = RandomWalkParams {
            inflation_rate: f64::NEG_INFINITY,
            ..managed_money_params()
        };
        let err = simulate_managed_money(&params, "mm", &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, SeasonalityError::NonFiniteParameter { parameter: "inflation_rate", .. }));
    }
}
