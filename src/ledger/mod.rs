//! Ledger domain models and the leaf algorithms that operate on them.

pub mod budget;
pub mod dates;
pub mod recurrence;
pub mod transaction;

pub use budget::{
    resolve_planned_amount, BudgetCategory, BudgetGroup, BudgetOverride, GroupKind, OverrideSet,
};
pub use dates::{format_date, parse_date, DateRange, Month, MonthSpan};
pub use recurrence::{expand_recurrence, DEFAULT_HORIZON_YEARS, MAX_OCCURRENCES};
pub use transaction::{RecurUnit, Recurrence, Transaction, TransactionStatus};
