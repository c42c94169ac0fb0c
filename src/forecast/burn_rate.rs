//! Forecasts a per-day burn rate for variable budget categories.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ledger::{BudgetGroup, GroupKind, Month, OverrideSet, Transaction};

/// Daily decay applied to the projected balance for one month.
///
/// The rate may be zero or negative; a negative rate means expected
/// income outweighs expected spend and the projection trends upward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BurnRate {
    pub rate_per_day: f64,
    /// First day-of-month the rate applies to.
    pub start_day: u32,
    pub is_projected: bool,
}

impl BurnRate {
    /// Rate for a fully known month: nothing left to forecast.
    pub fn settled() -> Self {
        Self {
            rate_per_day: 0.0,
            start_day: 1,
            is_projected: false,
        }
    }
}

/// Computes the flat daily burn for `month` as seen from `today`.
///
/// Months before today's month are settled history and forecast nothing.
/// For the current month the rate only covers the remaining days, starting
/// today; future months spread their full remainder across every day.
///
/// Only variable categories participate. Each one contributes
/// `max(0, planned - actual)` where `actual` sums the absolute amounts of
/// non-skipped ledger entries in that category dated within the month,
/// outflows for expense and goal groups, inflows for income groups.
/// Expense and goal remainders add to the burn; income remainders offset
/// it. The model is deliberately linear: variable spend is assumed to
/// accrue evenly over the remaining days.
pub fn forecast_burn_rate(
    month: Month,
    today: NaiveDate,
    groups: &[BudgetGroup],
    overrides: &OverrideSet,
    ledger: &[Transaction],
) -> BurnRate {
    let current = Month::containing(today);
    if month < current {
        return BurnRate::settled();
    }

    let start_day = if month == current { today.day() } else { 1 };
    let divisor = (month.day_count() - start_day + 1) as f64;

    let mut total = 0.0;
    for group in groups {
        for category in &group.categories {
            if category.is_fixed {
                continue;
            }
            let planned = overrides.resolve(category, month);
            let actual = actual_for_category(ledger, category.id, month, group.kind);
            let remaining = (planned - actual).max(0.0);
            match group.kind {
                GroupKind::Expense | GroupKind::Goal => total += remaining,
                GroupKind::Income => total -= remaining,
            }
        }
    }

    BurnRate {
        rate_per_day: total / divisor,
        start_day,
        is_projected: true,
    }
}

fn actual_for_category(
    ledger: &[Transaction],
    category_id: uuid::Uuid,
    month: Month,
    kind: GroupKind,
) -> f64 {
    ledger
        .iter()
        .filter(|txn| txn.counts())
        .filter(|txn| txn.category_id == Some(category_id))
        .filter(|txn| month.contains(txn.date))
        .filter(|txn| match kind {
            GroupKind::Income => txn.amount > 0.0,
            GroupKind::Expense | GroupKind::Goal => txn.amount < 0.0,
        })
        .map(|txn| txn.amount.abs())
        .sum()
}
