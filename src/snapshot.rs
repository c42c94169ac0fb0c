//! Cached monthly opening balances and their invalidation policy.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::{Month, Transaction};

/// Opening balance for a month computed from scratch: the sum of every
/// non-skipped, non-ghost ledger entry dated strictly before the month's
/// first day.
pub fn opening_balance_from_ledger(month: Month, ledger: &[Transaction]) -> f64 {
    let first = month.first_day();
    ledger
        .iter()
        .filter(|txn| txn.counts() && !txn.is_ghost)
        .filter(|txn| txn.date < first)
        .map(|txn| txn.amount)
        .sum()
}

/// The first month whose snapshot a mutation on `date` invalidates.
///
/// A ledger change can only affect balances on or after its own month, so
/// everything from that month onward must be dropped and nothing earlier.
pub fn invalidation_start(date: NaiveDate) -> Month {
    Month::containing(date)
}

/// Memoized opening balances keyed by month.
///
/// The set itself cannot tell whether an entry is stale; callers must
/// invalidate synchronously with every ledger mutation, before any
/// subsequent read is allowed to trust a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotSet {
    entries: BTreeMap<Month, f64>,
}

impl SnapshotSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, month: Month) -> Option<f64> {
        self.entries.get(&month).copied()
    }

    pub fn insert(&mut self, month: Month, balance: f64) {
        self.entries.insert(month, balance);
    }

    /// Drops the snapshot for `month` and every later month.
    pub fn invalidate_from(&mut self, month: Month) {
        self.entries.split_off(&month);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
