mod common;

use common::date;

use runway_core::ledger::{
    expand_recurrence, DateRange, RecurUnit, Recurrence, Transaction, TransactionStatus,
};
use runway_core::storage::ProjectionStore;

#[test]
fn monthly_anchor_expands_to_the_two_year_horizon() {
    let template = Transaction::new("Streaming", -50.0, date(2024, 1, 15))
        .with_status(TransactionStatus::Cleared)
        .with_recurrence(Recurrence::new(1, RecurUnit::Months));

    let series = expand_recurrence(&template, None, date(2024, 1, 15)).unwrap();

    assert_eq!(series[0].date, date(2024, 1, 15));
    assert_eq!(series[1].date, date(2024, 2, 15));
    assert_eq!(series[2].date, date(2024, 3, 15));
    assert_eq!(series.last().unwrap().date, date(2026, 1, 15));
    assert_eq!(series[0].status, TransactionStatus::Cleared);
    assert!(series[1..]
        .iter()
        .all(|occ| occ.status == TransactionStatus::Expected));
}

#[test]
fn expansion_is_ordered_and_bounded_by_the_end_date() {
    let template = Transaction::new("Quarterly", -120.0, date(2024, 2, 29))
        .with_recurrence(Recurrence::new(3, RecurUnit::Months).until(date(2025, 3, 1)));

    let series = expand_recurrence(&template, None, date(2024, 2, 29)).unwrap();

    for pair in series.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
    assert!(series.iter().all(|occ| occ.date <= date(2025, 3, 1)));
    assert_eq!(series[0].date, template.date);
}

#[test]
fn re_expansion_yields_the_same_dated_sequence() {
    let template = Transaction::new("Insurance", -90.0, date(2024, 5, 1))
        .with_recurrence(Recurrence::new(2, RecurUnit::Weeks).until(date(2024, 8, 1)));

    let first = expand_recurrence(&template, None, date(2024, 5, 1)).unwrap();
    let second = expand_recurrence(&template, None, date(2024, 5, 1)).unwrap();

    let first_dates: Vec<_> = first.iter().map(|occ| occ.date).collect();
    let second_dates: Vec<_> = second.iter().map(|occ| occ.date).collect();
    assert_eq!(first_dates, second_dates);
}

#[test]
fn series_survives_round_trip_through_the_service() {
    let service = common::empty_service();
    let template = Transaction::new("Paycheck", 2500.0, date(2024, 1, 31))
        .with_status(TransactionStatus::Cleared)
        .with_recurrence(Recurrence::new(1, RecurUnit::Months).until(date(2024, 6, 30)));

    service
        .record_transaction(&template, None, date(2024, 1, 31))
        .unwrap();

    let rows = service
        .store()
        .list_transactions(DateRange::up_to(date(2024, 12, 31)))
        .unwrap();
    // Jan 31, then clamped month-ends through June.
    let dates: Vec<_> = rows.iter().map(|txn| txn.date).collect();
    assert_eq!(
        dates,
        vec![
            date(2024, 1, 31),
            date(2024, 2, 29),
            date(2024, 3, 29),
            date(2024, 4, 29),
            date(2024, 5, 29),
            date(2024, 6, 29),
        ]
    );
    let series_id = rows[0].recurrence_id;
    assert!(rows.iter().all(|txn| txn.recurrence_id == series_id));
}

#[test]
fn delete_this_and_future_truncates_the_series() {
    let service = common::empty_service();
    let template = Transaction::new("Gym", -30.0, date(2024, 1, 5))
        .with_recurrence(Recurrence::new(1, RecurUnit::Months).until(date(2024, 6, 5)));
    service
        .record_transaction(&template, None, date(2024, 1, 5))
        .unwrap();
    let series_id = service
        .store()
        .get_transaction(template.id)
        .unwrap()
        .unwrap()
        .recurrence_id
        .unwrap();

    service
        .delete_series_from(series_id, date(2024, 4, 5))
        .unwrap();

    let rows = service
        .store()
        .list_transactions(DateRange::up_to(date(2024, 12, 31)))
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|txn| txn.date < date(2024, 4, 5)));
}
