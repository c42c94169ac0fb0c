//! Persistence abstraction for the projection engine.
//!
//! The engine never talks to a concrete store; it goes through
//! [`ProjectionStore`], which models the queryable relational store the
//! surrounding application owns. Two backends ship with the crate: an
//! in-memory reference implementation and a JSON file store.

pub mod json;
pub mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EngineError, Result};
use crate::ledger::{BudgetGroup, BudgetOverride, DateRange, Month, MonthSpan, Transaction};
use crate::snapshot::SnapshotSet;

/// Queryable store the engine reads from and the write path mutates.
///
/// Implementations take `&self`; interior synchronization is the
/// backend's concern. Batch writes are all-or-nothing: a failed batch
/// must leave no partial series visible to readers.
pub trait ProjectionStore: Send + Sync {
    fn list_transactions(&self, range: DateRange) -> Result<Vec<Transaction>>;
    fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>>;
    fn list_budget_groups(&self) -> Result<Vec<BudgetGroup>>;
    fn list_budget_overrides(&self, span: MonthSpan) -> Result<Vec<BudgetOverride>>;

    fn get_snapshot(&self, month: Month) -> Result<Option<f64>>;
    fn put_snapshot(&self, month: Month, balance: f64) -> Result<()>;
    fn invalidate_snapshots_from(&self, month: Month) -> Result<()>;

    fn upsert_transaction(&self, txn: &Transaction) -> Result<Uuid>;
    fn upsert_transactions(&self, txns: &[Transaction]) -> Result<Vec<Uuid>>;
    fn delete_transaction(&self, id: Uuid) -> Result<()>;
    fn delete_transactions_by_recurrence(&self, series: Uuid, from: NaiveDate) -> Result<()>;

    fn upsert_budget_override(&self, category_id: Uuid, month: Month, amount: f64) -> Result<()>;
    fn delete_budget_overrides_from(&self, category_id: Uuid, month: Month) -> Result<()>;
    fn set_category_planned_amount(&self, category_id: Uuid, amount: f64) -> Result<()>;
}

/// The full persisted data set, shared by the bundled backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub groups: Vec<BudgetGroup>,
    #[serde(default)]
    pub overrides: Vec<BudgetOverride>,
    #[serde(default)]
    pub snapshots: SnapshotSet,
}

impl StoreData {
    pub fn list_transactions(&self, range: DateRange) -> Vec<Transaction> {
        let mut rows: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|txn| range.contains(txn.date))
            .cloned()
            .collect();
        rows.sort_by_key(|txn| txn.date);
        rows
    }

    pub fn get_transaction(&self, id: Uuid) -> Option<Transaction> {
        self.transactions.iter().find(|txn| txn.id == id).cloned()
    }

    pub fn list_budget_groups(&self) -> Vec<BudgetGroup> {
        let mut groups = self.groups.clone();
        groups.sort_by_key(|group| group.sort_order);
        for group in &mut groups {
            group.categories.sort_by_key(|category| category.sort_order);
        }
        groups
    }

    pub fn list_budget_overrides(&self, span: MonthSpan) -> Vec<BudgetOverride> {
        self.overrides
            .iter()
            .filter(|entry| span.contains(entry.month))
            .cloned()
            .collect()
    }

    pub fn upsert_transaction(&mut self, txn: &Transaction) -> Result<Uuid> {
        if txn.is_ghost {
            return Err(EngineError::GhostWrite);
        }
        match self.transactions.iter_mut().find(|row| row.id == txn.id) {
            Some(row) => *row = txn.clone(),
            None => self.transactions.push(txn.clone()),
        }
        Ok(txn.id)
    }

    pub fn upsert_transactions(&mut self, txns: &[Transaction]) -> Result<Vec<Uuid>> {
        if txns.iter().any(|txn| txn.is_ghost) {
            return Err(EngineError::GhostWrite);
        }
        txns.iter().map(|txn| self.upsert_transaction(txn)).collect()
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> Result<()> {
        let before = self.transactions.len();
        self.transactions.retain(|txn| txn.id != id);
        if self.transactions.len() == before {
            return Err(EngineError::UnknownTransaction(id));
        }
        Ok(())
    }

    pub fn delete_transactions_by_recurrence(&mut self, series: Uuid, from: NaiveDate) {
        self.transactions
            .retain(|txn| !(txn.recurrence_id == Some(series) && txn.date >= from));
    }

    pub fn upsert_budget_override(&mut self, category_id: Uuid, month: Month, amount: f64) {
        match self
            .overrides
            .iter_mut()
            .find(|entry| entry.category_id == category_id && entry.month == month)
        {
            Some(entry) => entry.amount = amount,
            None => self.overrides.push(BudgetOverride {
                category_id,
                month,
                amount,
            }),
        }
    }

    pub fn delete_budget_overrides_from(&mut self, category_id: Uuid, month: Month) {
        self.overrides
            .retain(|entry| !(entry.category_id == category_id && entry.month >= month));
    }

    pub fn set_category_planned_amount(&mut self, category_id: Uuid, amount: f64) -> Result<()> {
        for group in &mut self.groups {
            if let Some(category) = group
                .categories
                .iter_mut()
                .find(|category| category.id == category_id)
            {
                category.planned_amount = amount;
                return Ok(());
            }
        }
        Err(EngineError::UnknownCategory(category_id))
    }

    pub fn category_exists(&self, category_id: Uuid) -> bool {
        self.groups
            .iter()
            .any(|group| group.categories.iter().any(|c| c.id == category_id))
    }
}

pub use json::JsonStore;
pub use memory::MemoryStore;
