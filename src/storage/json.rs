//! JSON file backend. One file holds the full data set; every mutation
//! rewrites it atomically (temp file + rename) so readers never observe a
//! half-written store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::errors::{EngineError, Result};
use crate::ledger::{BudgetGroup, BudgetOverride, DateRange, Month, MonthSpan, Transaction};

use super::{ProjectionStore, StoreData};

const FILE_EXTENSION: &str = "json";

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonStore {
    /// Opens (or creates) the store file at an explicit path.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            StoreData::default()
        };
        info!(path = %path.display(), "opened json store");
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Opens a named store under the platform data directory.
    pub fn open_default(name: &str) -> Result<Self> {
        let root = dirs::data_dir()
            .ok_or_else(|| EngineError::Storage("no platform data directory".into()))?
            .join("runway");
        fs::create_dir_all(&root)?;
        Self::open_at(root.join(name).with_extension(FILE_EXTENSION))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Installs the budget configuration and persists it.
    pub fn seed_groups(&self, groups: Vec<BudgetGroup>) -> Result<()> {
        let mut data = self.lock()?;
        data.groups = groups;
        self.persist(&data)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreData>> {
        self.data
            .lock()
            .map_err(|_| EngineError::Storage("json store lock poisoned".into()))
    }

    fn persist(&self, data: &StoreData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(data)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ProjectionStore for JsonStore {
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
        let mut data = self.lock()?;
        data.snapshots.insert(month, balance);
        self.persist(&data)
    }

    fn invalidate_snapshots_from(&self, month: Month) -> Result<()> {
        let mut data = self.lock()?;
        data.snapshots.invalidate_from(month);
        self.persist(&data)
    }

    fn upsert_transaction(&self, txn: &Transaction) -> Result<Uuid> {
        let mut data = self.lock()?;
        let id = data.upsert_transaction(txn)?;
        self.persist(&data)?;
        Ok(id)
    }

    fn upsert_transactions(&self, txns: &[Transaction]) -> Result<Vec<Uuid>> {
        let mut data = self.lock()?;
        let ids = data.upsert_transactions(txns)?;
        self.persist(&data)?;
        Ok(ids)
    }

    fn delete_transaction(&self, id: Uuid) -> Result<()> {
        let mut data = self.lock()?;
        data.delete_transaction(id)?;
        self.persist(&data)
    }

    fn delete_transactions_by_recurrence(&self, series: Uuid, from: NaiveDate) -> Result<()> {
        let mut data = self.lock()?;
        data.delete_transactions_by_recurrence(series, from);
        self.persist(&data)
    }

    fn upsert_budget_override(&self, category_id: Uuid, month: Month, amount: f64) -> Result<()> {
        let mut data = self.lock()?;
        data.upsert_budget_override(category_id, month, amount);
        self.persist(&data)
    }

    fn delete_budget_overrides_from(&self, category_id: Uuid, month: Month) -> Result<()> {
        let mut data = self.lock()?;
        data.delete_budget_overrides_from(category_id, month);
        self.persist(&data)
    }

    fn set_category_planned_amount(&self, category_id: Uuid, amount: f64) -> Result<()> {
        let mut data = self.lock()?;
        data.set_category_planned_amount(category_id, amount)?;
        self.persist(&data)
    }
}
