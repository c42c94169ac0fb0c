#![doc(test(attr(deny(warnings))))]

//! Runway Core is the financial projection engine behind a personal
//! budgeting application: it expands recurrence rules into dated
//! occurrences, folds a ledger into day-by-day balance series, forecasts
//! a per-day burn rate for variable budget categories, resolves layered
//! budget configuration, and governs the opening-balance snapshot cache.

pub mod errors;
pub mod forecast;
pub mod ledger;
pub mod planner;
pub mod service;
pub mod simulation;
pub mod snapshot;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Runway Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
