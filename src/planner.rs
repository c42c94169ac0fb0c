//! Pure decision functions for edits the write path executes.
//!
//! Keeping the branching out of the persistence calls makes the edit
//! semantics testable without a store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, Result};
use crate::ledger::{
    expand_recurrence, BudgetCategory, BudgetOverride, Month, OverrideSet, Transaction,
};

/// How far an edit to one occurrence of a recurring series reaches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EditScope {
    ThisOnly,
    ThisAndFuture,
}

/// Store operations a recurring-series edit resolves to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditPlan {
    pub to_delete: Vec<Uuid>,
    pub to_insert: Vec<Transaction>,
    pub to_update: Vec<Transaction>,
}

/// Plans an edit of `edited` (an occurrence already present in `series`).
///
/// `ThisOnly` updates the single occurrence in place; it keeps its series
/// id. `ThisAndFuture` removes the occurrence and everything later in the
/// series, then inserts a replacement series expanded from the edited
/// transaction; when the edit keeps a recurrence rule the replacement
/// forks into a fresh series, otherwise it is the lone edited entry.
pub fn plan_recurring_edit(
    series: &[Transaction],
    edited: Transaction,
    scope: EditScope,
    today: NaiveDate,
) -> Result<EditPlan> {
    let original = series
        .iter()
        .find(|txn| txn.id == edited.id)
        .ok_or(EngineError::UnknownTransaction(edited.id))?;

    match scope {
        EditScope::ThisOnly => Ok(EditPlan {
            to_update: vec![edited],
            ..EditPlan::default()
        }),
        EditScope::ThisAndFuture => {
            let cutoff = original.date;
            let to_delete = series
                .iter()
                .filter(|txn| txn.date >= cutoff)
                .map(|txn| txn.id)
                .collect();
            let to_insert = expand_recurrence(&edited, None, today)?;
            Ok(EditPlan {
                to_delete,
                to_insert,
                to_update: Vec::new(),
            })
        }
    }
}

/// Override writes that keep history intact when a category's base plan
/// changes "from this month forward".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetEditPlan {
    /// Overrides pinning the old amount onto prior months that had none.
    pub backfill: Vec<BudgetOverride>,
    /// Overrides from this month onward are cleared so the new base
    /// applies.
    pub clear_from: Month,
}

/// Plans a base-amount change effective `from_month`. Months in
/// `[history_start, from_month)` without an explicit override get one at
/// the old base amount; everything from `from_month` on is cleared.
pub fn plan_base_amount_change(
    category: &BudgetCategory,
    overrides: &OverrideSet,
    from_month: Month,
    history_start: Month,
) -> BudgetEditPlan {
    let mut backfill = Vec::new();
    let mut month = history_start;
    while month < from_month {
        if overrides.get(category.id, month).is_none() {
            backfill.push(BudgetOverride {
                category_id: category.id,
                month,
                amount: category.planned_amount,
            });
        }
        month = month.next();
    }
    BudgetEditPlan {
        backfill,
        clear_from: from_month,
    }
}
