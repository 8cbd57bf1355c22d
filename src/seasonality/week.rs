use chrono::{Datelike, NaiveDate};

/// Seasonal week bucket derived from the day of year (not ISO 8601).
///
/// Days whose ordinal leaves a remainder of 0 or 1 modulo 7 stay in
/// `ordinal / 7`, the rest round up to the next bucket. The first of
/// January would land in bucket 0 and is folded into week 1, so the range
/// is `1..=53`.
pub fn week_number(date: NaiveDate) -> u32 {
    let ordinal = date.ordinal();
    let week = match ordinal % 7 {
        0 | 1 => ordinal / 7,
        _ => ordinal / 7 + 1,
    };
    week.max(1)
}
