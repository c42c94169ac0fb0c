//! Expands a recurring transaction template into dated occurrences.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{EngineError, Result};

use super::dates::shift_year;
use super::transaction::{Transaction, TransactionStatus};

/// Upper bound on occurrences emitted after the anchor, guarding against
/// pathological rule parameters.
pub const MAX_OCCURRENCES: usize = 200;

/// Horizon applied when a rule carries no end date.
pub const DEFAULT_HORIZON_YEARS: i32 = 2;

/// Expands a template into its ordered occurrence series, earliest first.
///
/// The first element is the anchor itself: it keeps the status the user
/// chose and is assigned `existing_series_id` when re-expanding an edited
/// series, or a fresh series id otherwise. Every later occurrence advances
/// the previous date by the rule's interval, is marked `Expected`, carries
/// the series id, and drops the rule payload so only the anchor remains a
/// template. Expansion stops once the next date would pass the rule's end
/// date, defaulting to two years from `today`.
///
/// A non-recurring template comes back unchanged as a single-element
/// series. The dated sequence is a pure function of the inputs; only the
/// generated occurrence ids differ between runs.
pub fn expand_recurrence(
    template: &Transaction,
    existing_series_id: Option<Uuid>,
    today: NaiveDate,
) -> Result<Vec<Transaction>> {
    let Some(rule) = template.recurrence.clone() else {
        return Ok(vec![template.clone()]);
    };
    if rule.every == 0 {
        return Err(EngineError::InvalidRecurrence(
            "repeat frequency must be a positive integer".into(),
        ));
    }

    let series_id = existing_series_id.unwrap_or_else(Uuid::new_v4);
    let end = rule
        .end_date
        .unwrap_or_else(|| shift_year(today, DEFAULT_HORIZON_YEARS));

    let mut anchor = template.clone();
    anchor.recurrence_id = Some(series_id);
    let mut series = vec![anchor];

    let mut date = rule.unit.advance(template.date, rule.every);
    while date <= end && series.len() <= MAX_OCCURRENCES {
        let mut occurrence = template.clone();
        occurrence.id = Uuid::new_v4();
        occurrence.date = date;
        occurrence.status = TransactionStatus::Expected;
        occurrence.recurrence = None;
        occurrence.recurrence_id = Some(series_id);
        series.push(occurrence);
        date = rule.unit.advance(date, rule.every);
    }

    debug!(
        series = %series_id,
        occurrences = series.len(),
        end = %end,
        "expanded recurrence series"
    );
    Ok(series)
}
