use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates::{shift_month, shift_year};

/// One ledger entry, or the anchor template of a recurring series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub name: String,
    /// Signed amount: positive is inflow, negative is outflow.
    pub amount: f64,
    pub date: NaiveDate,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Uuid>,
    /// Present on the anchor of a recurring series only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    /// Shared by every occurrence of one recurring series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<Uuid>,
    /// What-if entries live only in memory and never reach the store.
    #[serde(default)]
    pub is_ghost: bool,
}

impl Transaction {
    pub fn new(name: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            date,
            status: TransactionStatus::Pending,
            category_id: None,
            group_id: None,
            recurrence: None,
            recurrence_id: None,
            is_ghost: false,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_category(mut self, category_id: Uuid, group_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self.group_id = Some(group_id);
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Whether this entry participates in balance and spend aggregates.
    pub fn counts(&self) -> bool {
        self.status != TransactionStatus::Skipped
    }
}

/// Ledger entry lifecycle states.
///
/// `Skipped` entries stay stored but are excluded from every balance and
/// aggregate computation. `Expected` entries are future-dated or
/// unconfirmed; they flow into projections but are flagged apart from
/// confirmed activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Cleared,
    Pending,
    Expected,
    Skipped,
}

/// Units a recurrence rule advances by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl RecurUnit {
    /// Advances a date by `every` units. Month and year steps clamp the
    /// day-of-month to the last valid day of the target month, so the
    /// result is deterministic for any input (Jan 31 -> Feb 28/29).
    pub fn advance(&self, from: NaiveDate, every: u32) -> NaiveDate {
        match self {
            RecurUnit::Days => from + Duration::days(every as i64),
            RecurUnit::Weeks => from + Duration::weeks(every as i64),
            RecurUnit::Months => shift_month(from, every as i32),
            RecurUnit::Years => shift_year(from, every as i32),
        }
    }
}

/// Repeat rule carried by the anchor of a recurring series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recurrence {
    /// Positive repeat frequency; zero is a caller error.
    pub every: u32,
    pub unit: RecurUnit,
    /// Absent means "two years from today" at expansion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Recurrence {
    pub fn new(every: u32, unit: RecurUnit) -> Self {
        Self {
            every,
            unit,
            end_date: None,
        }
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn advance_handles_each_unit() {
        let start = date(2024, 1, 15);
        assert_eq!(RecurUnit::Days.advance(start, 10), date(2024, 1, 25));
        assert_eq!(RecurUnit::Weeks.advance(start, 2), date(2024, 1, 29));
        assert_eq!(RecurUnit::Months.advance(start, 1), date(2024, 2, 15));
        assert_eq!(RecurUnit::Years.advance(start, 1), date(2025, 1, 15));
    }

    #[test]
    fn advance_clamps_month_end() {
        assert_eq!(
            RecurUnit::Months.advance(date(2024, 1, 31), 1),
            date(2024, 2, 29)
        );
    }

    #[test]
    fn skipped_entries_do_not_count() {
        let txn = Transaction::new("Coffee", -4.5, date(2024, 3, 1));
        assert!(txn.counts());
        assert!(!txn.with_status(TransactionStatus::Skipped).counts());
    }
}
