use chrono::NaiveDate;
use uuid::Uuid;

use runway_core::ledger::{BudgetCategory, BudgetGroup, GroupKind, Month};
use runway_core::service::ProjectionService;
use runway_core::storage::MemoryStore;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn month(y: i32, m: u32) -> Month {
    Month::new(y, m).unwrap()
}

/// Service over an empty in-memory store.
pub fn empty_service() -> ProjectionService<MemoryStore> {
    ProjectionService::new(MemoryStore::new())
}

/// Service seeded with one variable expense category ("Groceries", 300
/// planned); returns its id alongside.
pub fn budgeted_service() -> (ProjectionService<MemoryStore>, Uuid) {
    let groceries = BudgetCategory::new("Groceries", 300.0, 0);
    let category_id = groceries.id;
    let service = empty_service();
    service
        .store()
        .seed_groups(vec![
            BudgetGroup::new("Spending", GroupKind::Expense, 0).with_category(groceries),
        ])
        .unwrap();
    (service, category_id)
}
