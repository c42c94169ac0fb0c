//! In-memory reference backend, used by tests and as the model other
//! backends follow.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::{EngineError, Result};
use crate::ledger::{BudgetGroup, BudgetOverride, DateRange, Month, MonthSpan, Transaction};

use super::{ProjectionStore, StoreData};

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: StoreData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }

    /// Installs the budget configuration. Backend-specific: the engine
    /// only ever reads groups through [`ProjectionStore`].
    pub fn seed_groups(&self, groups: Vec<BudgetGroup>) -> Result<()> {
        self.lock()?.groups = groups;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreData>> {
        self.data
            .lock()
            .map_err(|_| EngineError::Storage("memory store lock poisoned".into()))
    }
}

impl ProjectionStore for MemoryStore {
    fn list_transactions(&self, range: DateRange) -> Result<Vec<Transaction>> {
        Ok(self.lock()?.list_transactions(range))
    }

    fn get_transaction(&self, id: Uuid) -> Result<Option<Transaction>> {
        Ok(self.lock()?.get_transaction(id))
    }

    fn list_budget_groups(&self) -> Result<Vec<BudgetGroup>> {
        Ok(self.lock()?.list_budget_groups())
    }

    fn list_budget_overrides(&self, span: MonthSpan) -> Result<Vec<BudgetOverride>> {
        Ok(self.lock()?.list_budget_overrides(span))
    }

    fn get_snapshot(&self, month: Month) -> Result<Option<f64>> {
        Ok(self.lock()?.snapshots.get(month))
    }

    fn put_snapshot(&self, month: Month, balance: f64) -> Result<()> {
        self.lock()?.snapshots.insert(month, balance);
        Ok(())
    }

    fn invalidate_snapshots_from(&self, month: Month) -> Result<()> {
        self.lock()?.snapshots.invalidate_from(month);
        Ok(())
    }

    fn upsert_transaction(&self, txn: &Transaction) -> Result<Uuid> {
        self.lock()?.upsert_transaction(txn)
    }

    fn upsert_transactions(&self, txns: &[Transaction]) -> Result<Vec<Uuid>> {
        self.lock()?.upsert_transactions(txns)
    }

    fn delete_transaction(&self, id: Uuid) -> Result<()> {
        self.lock()?.delete_transaction(id)
    }

    fn delete_transactions_by_recurrence(&self, series: Uuid, from: NaiveDate) -> Result<()> {
        self.lock()?.delete_transactions_by_recurrence(series, from);
        Ok(())
    }

    fn upsert_budget_override(&self, category_id: Uuid, month: Month, amount: f64) -> Result<()> {
        self.lock()?.upsert_budget_override(category_id, month, amount);
        Ok(())
    }

    fn delete_budget_overrides_from(&self, category_id: Uuid, month: Month) -> Result<()> {
        self.lock()?.delete_budget_overrides_from(category_id, month);
        Ok(())
    }

    fn set_category_planned_amount(&self, category_id: Uuid, amount: f64) -> Result<()> {
        self.lock()?.set_category_planned_amount(category_id, amount)
    }
}
