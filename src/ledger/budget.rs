//! Budget configuration: groups, categories, and per-month overrides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates::Month;

/// Classifies a budget group's cash-flow direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Income,
    Expense,
    Goal,
}

/// A named collection of categories sharing one cash-flow direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetGroup {
    pub id: Uuid,
    pub name: String,
    pub kind: GroupKind,
    pub sort_order: u32,
    #[serde(default)]
    pub categories: Vec<BudgetCategory>,
}

impl BudgetGroup {
    pub fn new(name: impl Into<String>, kind: GroupKind, sort_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            sort_order,
            categories: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: BudgetCategory) -> Self {
        self.categories.push(category);
        self
    }
}

/// A single budget line with a base monthly plan.
///
/// Fixed categories (rent, subscriptions) are excluded from burn-rate
/// forecasting; only variable categories are assumed to pace evenly
/// through the month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategory {
    pub id: Uuid,
    pub name: String,
    pub planned_amount: f64,
    pub is_fixed: bool,
    pub sort_order: u32,
}

impl BudgetCategory {
    pub fn new(name: impl Into<String>, planned_amount: f64, sort_order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            planned_amount,
            is_fixed: false,
            sort_order,
        }
    }

    pub fn fixed(mut self) -> Self {
        self.is_fixed = true;
        self
    }
}

/// A per-month replacement of a category's base planned amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetOverride {
    pub category_id: Uuid,
    pub month: Month,
    pub amount: f64,
}

/// Indexed override lookup. At most one override exists per
/// `(category, month)` pair; inserting again replaces the prior amount.
/// Resolution is O(1) expected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideSet {
    entries: HashMap<Uuid, HashMap<Month, f64>>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category_id: Uuid, month: Month, amount: f64) {
        self.entries
            .entry(category_id)
            .or_default()
            .insert(month, amount);
    }

    pub fn get(&self, category_id: Uuid, month: Month) -> Option<f64> {
        self.entries
            .get(&category_id)
            .and_then(|months| months.get(&month))
            .copied()
    }

    /// Effective planned amount for a category in a month: the override
    /// if one exists, else the category's base plan.
    pub fn resolve(&self, category: &BudgetCategory, month: Month) -> f64 {
        self.get(category.id, month)
            .unwrap_or(category.planned_amount)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|months| months.is_empty())
    }
}

impl FromIterator<BudgetOverride> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = BudgetOverride>>(iter: I) -> Self {
        let mut set = OverrideSet::new();
        for entry in iter {
            set.insert(entry.category_id, entry.month, entry.amount);
        }
        set
    }
}

/// Free-function form of [`OverrideSet::resolve`] for callers holding the
/// pieces separately.
pub fn resolve_planned_amount(
    category: &BudgetCategory,
    month: Month,
    overrides: &OverrideSet,
) -> f64 {
    overrides.resolve(category, month)
}
