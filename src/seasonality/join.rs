use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::types::PositionRecord;
use crate::simulation::{ManagedMoneyPoint, PositionPoint};

/// Inner join of the managed money series and the positions series on exact date.
///
/// Dates present on only one side are dropped. A date repeated on both sides
/// yields every pairing, in managed money order.
pub fn join_on_date(
    managed_money: &[ManagedMoneyPoint],
    positions: &[PositionPoint],
) -> Vec<PositionRecord> {
    let mut positions_by_date: HashMap<NaiveDate, Vec<&PositionPoint>> = HashMap::new();
    for point in positions {
        positions_by_date.entry(point.date).or_default().push(point);
    }

    let mut records = Vec::with_capacity(managed_money.len().min(positions.len()));
    let mut unmatched_managed_money = 0usize;
    for mm in managed_money {
        let Some(matches) = positions_by_date.get(&mm.date) else {
            unmatched_managed_money += 1;
            continue;
        };
        records.extend(matches.iter().map(|p| PositionRecord {
            date: mm.date,
            managed_money: mm.value,
            long_positions: p.long_positions,
            short_positions: p.short_positions,
        }));
    }

    let managed_money_dates = managed_money.iter().map(|p| p.date).collect::<HashSet<_>>();
    let unmatched_positions = positions
        .iter()
        .filter(|p| !managed_money_dates.contains(&p.date))
        .count();

    if unmatched_managed_money > 0 || unmatched_positions > 0 {
        warn!(
            unmatched_managed_money,
            unmatched_positions,
            "Dropped dates missing from one side of the join"
        );
    }
    debug!(joined = records.len(), "Joined managed money and positions on date");

    records
}
