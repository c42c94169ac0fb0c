//! Builds a day-indexed running balance series over a window, optionally
//! extended with a projected balance driven by per-month burn rates.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ledger::{DateRange, Month, Transaction};

use super::burn_rate::BurnRate;

/// One day of the balance series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub balance: f64,
    /// Populated once cumulative burn has started; stays populated for
    /// the rest of the window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected_balance: Option<f64>,
    pub is_future: bool,
    pub is_today: bool,
}

/// Folds the ledger into a daily balance series over `range`.
///
/// Each day's balance is the previous day's plus the sum of non-skipped
/// entries dated exactly that day, seeded from `opening_balance` (the
/// balance immediately before `range.start`).
///
/// When `burn_rates` carries a projecting rate for a day's month, a
/// cumulative burn accumulator starts at that month's `start_day`: one
/// rate unit that day, two the next, and so on, layered on the real
/// running balance. Once started, the accumulator is carried across month
/// boundaries: later projecting months keep compounding on top of it and
/// it is never reset to the real balance. The accumulator is threaded
/// explicitly through the fold rather than captured in a closure.
///
/// `is_future`/`is_today` tags are presentation hints only and never
/// affect the numbers. Windows shorter than two days have no meaningful
/// series and yield an empty vec.
pub fn build_balance_timeline(
    opening_balance: f64,
    ledger: &[Transaction],
    range: DateRange,
    burn_rates: Option<&HashMap<Month, BurnRate>>,
    today: NaiveDate,
) -> Vec<TimelinePoint> {
    if range.day_count() < 2 {
        return Vec::new();
    }

    let mut daily_deltas: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for txn in ledger.iter().filter(|txn| txn.counts()) {
        if range.contains(txn.date) {
            *daily_deltas.entry(txn.date).or_insert(0.0) += txn.amount;
        }
    }

    let mut points = Vec::with_capacity(range.day_count() as usize);
    let mut balance = opening_balance;
    // Cumulative burn so far; None until the first projecting day.
    let mut burn: Option<f64> = None;

    for day in range.days() {
        balance += daily_deltas.get(&day).copied().unwrap_or(0.0);

        let rate = burn_rates
            .and_then(|rates| rates.get(&Month::containing(day)))
            .filter(|rate| rate.is_projected);
        if let Some(rate) = rate {
            if day.day() >= rate.start_day {
                burn = Some(burn.unwrap_or(0.0) + rate.rate_per_day);
            }
        }

        points.push(TimelinePoint {
            date: day,
            balance,
            projected_balance: burn.map(|accumulated| balance - accumulated),
            is_future: day > today,
            is_today: day == today,
        });
    }

    points
}
