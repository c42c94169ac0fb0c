//! Orchestrates the pure engine over a [`ProjectionStore`].
//!
//! Every write that touches the ledger invalidates opening-balance
//! snapshots from the affected month onward before the call returns, so
//! no subsequent read can trust a stale snapshot. The engine computations
//! themselves stay pure; this layer only sequences fetches and writes.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::warn;
use uuid::Uuid;

use crate::errors::{EngineError, Result};
use crate::forecast::{build_balance_timeline, forecast_burn_rate, BurnRate, TimelinePoint};
use crate::ledger::{
    expand_recurrence, BudgetCategory, DateRange, Month, MonthSpan, OverrideSet, Transaction,
};
use crate::planner::{plan_base_amount_change, plan_recurring_edit, EditPlan, EditScope};
use crate::simulation::WhatIf;
use crate::snapshot::{invalidation_start, opening_balance_from_ledger};
use crate::storage::ProjectionStore;

pub struct ProjectionService<S: ProjectionStore> {
    store: S,
}

impl<S: ProjectionStore> ProjectionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Balance immediately before the first day of `month`, served from a
    /// snapshot when one exists, recomputed and memoized otherwise.
    pub fn opening_balance(&self, month: Month) -> Result<f64> {
        if let Some(balance) = self.store.get_snapshot(month)? {
            return Ok(balance);
        }
        let cutoff = month.first_day() - Duration::days(1);
        let ledger = self.store.list_transactions(DateRange::up_to(cutoff))?;
        let balance = opening_balance_from_ledger(month, &ledger);
        self.store.put_snapshot(month, balance)?;
        Ok(balance)
    }

    /// Records a transaction, expanding any recurrence rule into its full
    /// occurrence series. The whole series is written as one batch and
    /// snapshots are invalidated from the earliest written month before
    /// the write, inside the same call.
    pub fn record_transaction(
        &self,
        template: &Transaction,
        existing_series_id: Option<Uuid>,
        today: NaiveDate,
    ) -> Result<Vec<Uuid>> {
        if template.is_ghost {
            return Err(EngineError::GhostWrite);
        }
        let series = expand_recurrence(template, existing_series_id, today)?;
        self.store
            .invalidate_snapshots_from(invalidation_start(series[0].date))?;
        self.store.upsert_transactions(&series)
    }

    /// Applies a recurring-edit plan produced by
    /// [`plan_recurring_edit`]: deletes, then updates, then inserts, with
    /// snapshots invalidated from the earliest affected month first.
    pub fn apply_edit_plan(&self, plan: &EditPlan) -> Result<()> {
        let mut earliest: Option<NaiveDate> = None;
        let mut track = |date: NaiveDate| {
            earliest = Some(earliest.map_or(date, |current| current.min(date)));
        };
        for id in &plan.to_delete {
            if let Some(txn) = self.store.get_transaction(*id)? {
                track(txn.date);
            }
        }
        for txn in plan.to_update.iter().chain(plan.to_insert.iter()) {
            track(txn.date);
            if let Some(existing) = self.store.get_transaction(txn.id)? {
                track(existing.date);
            }
        }

        if let Some(date) = earliest {
            self.store
                .invalidate_snapshots_from(invalidation_start(date))?;
        }
        for id in &plan.to_delete {
            self.store.delete_transaction(*id)?;
        }
        for txn in &plan.to_update {
            self.store.upsert_transaction(txn)?;
        }
        if !plan.to_insert.is_empty() {
            self.store.upsert_transactions(&plan.to_insert)?;
        }
        Ok(())
    }

    /// Convenience wrapper: plans and applies an edit of one occurrence
    /// in a recurring series.
    pub fn edit_recurring(
        &self,
        edited: Transaction,
        scope: EditScope,
        today: NaiveDate,
    ) -> Result<()> {
        let original = self
            .store
            .get_transaction(edited.id)?
            .ok_or(EngineError::UnknownTransaction(edited.id))?;
        let series = match original.recurrence_id {
            Some(series_id) => self
                .store
                .list_transactions(DateRange::up_to(NaiveDate::MAX))?
                .into_iter()
                .filter(|txn| txn.recurrence_id == Some(series_id))
                .collect(),
            None => vec![original],
        };
        let plan = plan_recurring_edit(&series, edited, scope, today)?;
        self.apply_edit_plan(&plan)
    }

    pub fn delete_transaction(&self, id: Uuid) -> Result<()> {
        let txn = self
            .store
            .get_transaction(id)?
            .ok_or(EngineError::UnknownTransaction(id))?;
        self.store
            .invalidate_snapshots_from(invalidation_start(txn.date))?;
        self.store.delete_transaction(id)
    }

    /// Deletes "this and future" occurrences of a series.
    pub fn delete_series_from(&self, series: Uuid, from: NaiveDate) -> Result<()> {
        self.store
            .invalidate_snapshots_from(invalidation_start(from))?;
        self.store.delete_transactions_by_recurrence(series, from)
    }

    /// Overrides one month's planned amount for a category, leaving the
    /// base plan and every other month untouched.
    pub fn set_planned_amount_for_month(
        &self,
        category_id: Uuid,
        month: Month,
        amount: f64,
    ) -> Result<()> {
        self.find_category(category_id)?;
        self.store.upsert_budget_override(category_id, month, amount)
    }

    /// Changes a category's base plan "from this month forward":
    /// prior months keep the old amount via backfilled overrides, and
    /// overrides from `from_month` onward are cleared so the new base
    /// applies.
    pub fn set_planned_amount_from(
        &self,
        category_id: Uuid,
        from_month: Month,
        new_amount: f64,
        history_start: Month,
    ) -> Result<()> {
        let category = self.find_category(category_id)?;
        let span = MonthSpan::new(history_start, from_month)?;
        let overrides: OverrideSet = self
            .store
            .list_budget_overrides(span)?
            .into_iter()
            .collect();
        let plan = plan_base_amount_change(&category, &overrides, from_month, history_start);
        for entry in &plan.backfill {
            self.store
                .upsert_budget_override(entry.category_id, entry.month, entry.amount)?;
        }
        self.store
            .delete_budget_overrides_from(category_id, plan.clear_from)?;
        self.store.set_category_planned_amount(category_id, new_amount)
    }

    /// Burn rate for one month, composed from the stored budget
    /// configuration and that month's ledger slice.
    pub fn forecast_month(&self, month: Month, today: NaiveDate) -> Result<BurnRate> {
        let groups = self.store.list_budget_groups()?;
        let overrides: OverrideSet = self
            .store
            .list_budget_overrides(MonthSpan::single(month))?
            .into_iter()
            .collect();
        let ledger = self.store.list_transactions(DateRange::month(month))?;
        Ok(forecast_burn_rate(month, today, &groups, &overrides, &ledger))
    }

    /// Daily balance series over `range`, with projection when requested.
    ///
    /// A failure fetching the budget configuration degrades to an
    /// actuals-only series rather than failing the whole call; failures
    /// fetching the ledger itself propagate.
    pub fn timeline(
        &self,
        range: DateRange,
        today: NaiveDate,
        project: bool,
    ) -> Result<Vec<TimelinePoint>> {
        let opening = self.balance_before(range.start)?;
        let ledger = self.fetch_months_ledger(range)?;
        let rates = if project {
            self.burn_rates_for(range, today, &ledger)
        } else {
            None
        };
        Ok(build_balance_timeline(
            opening,
            &ledger,
            range,
            rates.as_ref(),
            today,
        ))
    }

    /// Timeline with a what-if overlay mixed in: ghosts inside the window
    /// land on their days, ghosts before it shift the opening balance,
    /// and nothing is persisted.
    pub fn timeline_what_if(
        &self,
        what_if: &WhatIf,
        range: DateRange,
        today: NaiveDate,
        project: bool,
    ) -> Result<Vec<TimelinePoint>> {
        let mut opening = self.balance_before(range.start)?;
        opening += what_if
            .ghosts
            .iter()
            .filter(|txn| txn.counts() && txn.date < range.start)
            .map(|txn| txn.amount)
            .sum::<f64>();
        let ledger = what_if.project_over(&self.fetch_months_ledger(range)?);
        let rates = if project {
            self.burn_rates_for(range, today, &ledger)
        } else {
            None
        };
        Ok(build_balance_timeline(
            opening,
            &ledger,
            range,
            rates.as_ref(),
            today,
        ))
    }

    fn find_category(&self, category_id: Uuid) -> Result<BudgetCategory> {
        self.store
            .list_budget_groups()?
            .into_iter()
            .flat_map(|group| group.categories)
            .find(|category| category.id == category_id)
            .ok_or(EngineError::UnknownCategory(category_id))
    }

    /// Balance immediately before `date`; goes through the snapshot path
    /// when `date` opens a month.
    fn balance_before(&self, date: NaiveDate) -> Result<f64> {
        let month = Month::containing(date);
        if date.day() == 1 {
            return self.opening_balance(month);
        }
        let ledger = self
            .store
            .list_transactions(DateRange::up_to(date - Duration::days(1)))?;
        Ok(ledger
            .iter()
            .filter(|txn| txn.counts() && !txn.is_ghost)
            .map(|txn| txn.amount)
            .sum())
    }

    /// Ledger rows for every month the range touches, so month-scoped
    /// burn actuals see days outside the window too.
    fn fetch_months_ledger(&self, range: DateRange) -> Result<Vec<Transaction>> {
        let months = range.months();
        let full = DateRange::new(
            months.first().map(|m| m.first_day()).unwrap_or(range.start),
            months.last().map(|m| m.last_day()).unwrap_or(range.end),
        )?;
        self.store.list_transactions(full)
    }

    fn burn_rates_for(
        &self,
        range: DateRange,
        today: NaiveDate,
        ledger: &[Transaction],
    ) -> Option<HashMap<Month, BurnRate>> {
        let months = range.months();
        let span = MonthSpan::new(*months.first()?, *months.last()?).ok()?;
        let groups = match self.store.list_budget_groups() {
            Ok(groups) => groups,
            Err(err) => {
                warn!("budget fetch failed, serving actuals only: {err}");
                return None;
            }
        };
        let overrides: OverrideSet = match self.store.list_budget_overrides(span) {
            Ok(rows) => rows.into_iter().collect(),
            Err(err) => {
                warn!("override fetch failed, serving actuals only: {err}");
                return None;
            }
        };
        Some(
            months
                .into_iter()
                .map(|month| {
                    (
                        month,
                        forecast_burn_rate(month, today, &groups, &overrides, ledger),
                    )
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        BudgetGroup, GroupKind, RecurUnit, Recurrence, TransactionStatus,
    };
    use crate::storage::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> Month {
        Month::new(y, m).unwrap()
    }

    fn service() -> ProjectionService<MemoryStore> {
        ProjectionService::new(MemoryStore::new())
    }

    #[test]
    fn opening_balance_memoizes_through_snapshots() {
        let svc = service();
        svc.store()
            .upsert_transaction(&Transaction::new("Jan", 100.0, date(2024, 1, 10)))
            .unwrap();
        // First read computes and memoizes; second is served from cache.
        assert_eq!(svc.opening_balance(month(2024, 2)).unwrap(), 100.0);
        assert_eq!(
            svc.store().get_snapshot(month(2024, 2)).unwrap(),
            Some(100.0)
        );
        assert_eq!(svc.opening_balance(month(2024, 2)).unwrap(), 100.0);
    }

    #[test]
    fn writes_invalidate_snapshots_from_their_month() {
        let svc = service();
        svc.store().put_snapshot(month(2024, 1), 0.0).unwrap();
        svc.store().put_snapshot(month(2024, 2), 10.0).unwrap();
        svc.store().put_snapshot(month(2024, 3), 20.0).unwrap();

        svc.record_transaction(
            &Transaction::new("Mid-Feb", -5.0, date(2024, 2, 10)),
            None,
            date(2024, 2, 10),
        )
        .unwrap();

        assert_eq!(svc.store().get_snapshot(month(2024, 1)).unwrap(), Some(0.0));
        assert_eq!(svc.store().get_snapshot(month(2024, 2)).unwrap(), None);
        assert_eq!(svc.store().get_snapshot(month(2024, 3)).unwrap(), None);
    }

    #[test]
    fn deleting_invalidates_and_recomputes() {
        let svc = service();
        let txn = Transaction::new("Feb", -30.0, date(2024, 2, 10));
        svc.record_transaction(&txn, None, date(2024, 2, 10)).unwrap();
        assert_eq!(svc.opening_balance(month(2024, 3)).unwrap(), -30.0);

        svc.delete_transaction(txn.id).unwrap();
        assert_eq!(svc.opening_balance(month(2024, 3)).unwrap(), 0.0);
    }

    #[test]
    fn recording_a_recurring_template_writes_the_whole_series() {
        let svc = service();
        let template = Transaction::new("Rent", -800.0, date(2024, 1, 1))
            .with_status(TransactionStatus::Cleared)
            .with_recurrence(Recurrence::new(1, RecurUnit::Months).until(date(2024, 4, 1)));
        let ids = svc
            .record_transaction(&template, None, date(2024, 1, 1))
            .unwrap();
        assert_eq!(ids.len(), 4);
        let rows = svc
            .store()
            .list_transactions(DateRange::up_to(date(2024, 12, 31)))
            .unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn ghost_templates_are_rejected_before_expansion() {
        let svc = service();
        let mut ghost = Transaction::new("WhatIf", -10.0, date(2024, 1, 1));
        ghost.is_ghost = true;
        assert!(matches!(
            svc.record_transaction(&ghost, None, date(2024, 1, 1)),
            Err(EngineError::GhostWrite)
        ));
    }

    #[test]
    fn base_amount_change_backfills_and_clears() {
        let svc = service();
        let groceries = BudgetCategory::new("Groceries", 300.0, 0);
        let category_id = groceries.id;
        svc.store()
            .seed_groups(vec![
                BudgetGroup::new("Spending", GroupKind::Expense, 0).with_category(groceries),
            ])
            .unwrap();
        // An override already pins April; May carries a stale override
        // that must be cleared by the base change.
        svc.store()
            .upsert_budget_override(category_id, month(2024, 4), 250.0)
            .unwrap();
        svc.store()
            .upsert_budget_override(category_id, month(2024, 6), 999.0)
            .unwrap();

        svc.set_planned_amount_from(category_id, month(2024, 5), 400.0, month(2024, 3))
            .unwrap();

        let overrides: OverrideSet = svc
            .store()
            .list_budget_overrides(MonthSpan::new(month(2024, 1), month(2024, 12)).unwrap())
            .unwrap()
            .into_iter()
            .collect();
        // March backfilled at the old base, April untouched.
        assert_eq!(overrides.get(category_id, month(2024, 3)), Some(300.0));
        assert_eq!(overrides.get(category_id, month(2024, 4)), Some(250.0));
        // May onward cleared; the new base applies.
        assert_eq!(overrides.get(category_id, month(2024, 5)), None);
        assert_eq!(overrides.get(category_id, month(2024, 6)), None);
        let groups = svc.store().list_budget_groups().unwrap();
        assert_eq!(groups[0].categories[0].planned_amount, 400.0);
    }

    #[test]
    fn override_for_unknown_category_fails_fast() {
        let svc = service();
        assert!(matches!(
            svc.set_planned_amount_for_month(Uuid::new_v4(), month(2024, 1), 100.0),
            Err(EngineError::UnknownCategory(_))
        ));
    }

    #[test]
    fn timeline_projects_with_stored_budget() {
        let svc = service();
        let groceries = BudgetCategory::new("Groceries", 300.0, 0);
        svc.store()
            .seed_groups(vec![
                BudgetGroup::new("Spending", GroupKind::Expense, 0).with_category(groceries),
            ])
            .unwrap();
        svc.record_transaction(
            &Transaction::new("Opening", 1000.0, date(2024, 3, 31)),
            None,
            date(2024, 4, 1),
        )
        .unwrap();

        // April, seen from the 1st: 300 remaining over 30 days = 10/day.
        let points = svc
            .timeline(
                DateRange::new(date(2024, 4, 1), date(2024, 4, 3)).unwrap(),
                date(2024, 4, 1),
                true,
            )
            .unwrap();
        assert_eq!(points[0].balance, 1000.0);
        assert_eq!(points[0].projected_balance, Some(990.0));
        assert_eq!(points[2].projected_balance, Some(970.0));
    }

    #[test]
    fn what_if_timeline_leaves_the_store_untouched() {
        let svc = service();
        svc.record_transaction(
            &Transaction::new("Opening", 500.0, date(2024, 2, 28)),
            None,
            date(2024, 3, 1),
        )
        .unwrap();
        let what_if = WhatIf::new("Vacation")
            .with_ghost(Transaction::new("Flights", -200.0, date(2024, 3, 2)));

        let points = svc
            .timeline_what_if(
                &what_if,
                DateRange::new(date(2024, 3, 1), date(2024, 3, 3)).unwrap(),
                date(2024, 3, 1),
                false,
            )
            .unwrap();
        assert_eq!(points[2].balance, 300.0);

        let rows = svc
            .store()
            .list_transactions(DateRange::up_to(date(2024, 12, 31)))
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn edit_this_and_future_replaces_the_tail() {
        let svc = service();
        let template = Transaction::new("Gym", -30.0, date(2024, 1, 5))
            .with_recurrence(Recurrence::new(1, RecurUnit::Months).until(date(2024, 5, 5)));
        svc.record_transaction(&template, None, date(2024, 1, 5))
            .unwrap();
        let rows = svc
            .store()
            .list_transactions(DateRange::up_to(date(2024, 12, 31)))
            .unwrap();
        let mut edited = rows
            .iter()
            .find(|txn| txn.date == date(2024, 3, 5))
            .unwrap()
            .clone();
        edited.amount = -45.0;
        edited.recurrence = Some(Recurrence::new(1, RecurUnit::Months).until(date(2024, 5, 5)));

        svc.edit_recurring(edited, EditScope::ThisAndFuture, date(2024, 3, 5))
            .unwrap();

        let rows = svc
            .store()
            .list_transactions(DateRange::up_to(date(2024, 12, 31)))
            .unwrap();
        let january = rows.iter().find(|t| t.date == date(2024, 1, 5)).unwrap();
        assert_eq!(january.amount, -30.0);
        let march = rows.iter().find(|t| t.date == date(2024, 3, 5)).unwrap();
        assert_eq!(march.amount, -45.0);
        let may = rows.iter().find(|t| t.date == date(2024, 5, 5)).unwrap();
        assert_eq!(may.amount, -45.0);
        assert_ne!(january.recurrence_id, march.recurrence_id);
    }
}
