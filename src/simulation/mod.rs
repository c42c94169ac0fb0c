//! What-if exploration over the ledger using ghost transactions.
//!
//! A ghost is an in-memory entry that must never be persisted or mixed
//! into authoritative aggregates. Overlaying is the explicit opt-in: the
//! merged ledger a [`WhatIf`] produces is the one place ghosts flow into
//! balance and burn computations.

use serde::{Deserialize, Serialize};

use crate::ledger::Transaction;

/// A named bundle of ghost transactions to preview against the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WhatIf {
    pub name: String,
    pub ghosts: Vec<Transaction>,
}

impl WhatIf {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ghosts: Vec::new(),
        }
    }

    pub fn with_ghost(mut self, txn: Transaction) -> Self {
        self.ghosts.push(txn);
        self
    }

    /// Merges the ghosts into a copy of the ledger, sorted by date. The
    /// source ledger is never mutated and every ghost comes back marked.
    pub fn project_over(&self, ledger: &[Transaction]) -> Vec<Transaction> {
        overlay(ledger, &self.ghosts)
    }
}

/// Date-sorted copy of `ledger` with `ghosts` mixed in, each marked
/// `is_ghost` regardless of how the caller built them.
pub fn overlay(ledger: &[Transaction], ghosts: &[Transaction]) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = ledger.to_vec();
    merged.extend(ghosts.iter().cloned().map(|mut ghost| {
        ghost.is_ghost = true;
        ghost
    }));
    merged.sort_by_key(|txn| txn.date);
    merged
}

/// Filters a previously overlaid ledger back down to authoritative rows.
pub fn strip_ghosts(ledger: &[Transaction]) -> Vec<Transaction> {
    ledger
        .iter()
        .filter(|txn| !txn.is_ghost)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn overlay_marks_and_sorts_without_touching_source() {
        let ledger = vec![
            Transaction::new("Rent", -800.0, date(2024, 3, 1)),
            Transaction::new("Pay", 2000.0, date(2024, 3, 15)),
        ];
        let what_if =
            WhatIf::new("New car").with_ghost(Transaction::new("Car", -350.0, date(2024, 3, 10)));

        let merged = what_if.project_over(&ledger);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[1].name, "Car");
        assert!(merged[1].is_ghost);
        assert!(ledger.iter().all(|txn| !txn.is_ghost));
    }

    #[test]
    fn strip_ghosts_recovers_the_authoritative_ledger() {
        let ledger = vec![Transaction::new("Rent", -800.0, date(2024, 3, 1))];
        let merged = overlay(&ledger, &[Transaction::new("X", -1.0, date(2024, 3, 2))]);
        assert_eq!(strip_ghosts(&merged), ledger);
    }
}
