//! # Domain Models
//!
//! Canonical domain types for pivotdesk.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, upper-cased ticker |
//! | [`DailyBar`] | One session's open/high/low/close |
//! | [`PriceSeries`] | Ascending, date-unique daily bars for a symbol |
//! | [`EconomicEvent`] | Economic-calendar entry |
//! | [`Importance`] | Calendar importance filter |
//!
//! Date helpers live in [`dates`].

mod calendar;
pub mod dates;
mod models;
mod symbol;

pub use calendar::{EconomicEvent, Importance};
pub use models::{DailyBar, PriceSeries};
pub use symbol::Symbol;
