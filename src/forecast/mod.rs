//! Derived numeric forecasts layered over the historical ledger.

pub mod burn_rate;
pub mod timeline;

pub use burn_rate::{forecast_burn_rate, BurnRate};
pub use timeline::{build_balance_timeline, TimelinePoint};
