//! # pivotdesk-core
//!
//! Pivot-point analysis for daily OHLC data, plus the sources and the
//! dashboard service that feed it.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pivot`] | Pivot levels, bar selection and the display window |
//! | [`domain`] | `Symbol`, `DailyBar`, `PriceSeries`, `EconomicEvent` |
//! | [`data_source`] | `PriceSource` / `CalendarSource` traits and requests |
//! | [`adapters`] | Yahoo chart and economic-calendar adapters |
//! | [`dashboard`] | Request-scoped orchestration with user-facing notices |
//! | [`config`] | `DashboardConfig` and its `PIVOTDESK_*` overrides |
//! | [`envelope`] | JSON response envelope |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pivotdesk_core::{Dashboard, DashboardConfig};
//! use time::macros::date;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dashboard = Dashboard::live(DashboardConfig::from_env()?);
//!     let analysis = dashboard.analyze("SPY", date!(2024 - 01 - 05)).await?;
//!     println!("pivot {:.2}", analysis.levels.pivot);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use pivotdesk_core::{DeskError, PivotError};
//!
//! fn describe(error: &DeskError) -> &'static str {
//!     match error {
//!         DeskError::Pivot(e) if e.is_no_market_data() => "no market data",
//!         DeskError::Pivot(_) => "bad upstream bar",
//!         DeskError::Source(_) => "provider failure",
//!         DeskError::Validation(_) => "bad input",
//!     }
//! }
//! # let _ = describe(&DeskError::Pivot(PivotError::InsufficientHistory { available: 0, required: 2 }));
//! ```

pub mod adapters;
pub mod config;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod pivot;
pub mod source;

pub use adapters::{EconomicCalendarAdapter, YahooAdapter};

pub use config::{ChartAxis, DashboardConfig, FetchWindow};

pub use dashboard::{Dashboard, DashboardPage, Notice, NoticeLevel, PageRequest, Timed};

pub use data_source::{
    CalendarRequest, CalendarSource, DailyBarsRequest, PriceSource, SourceError, SourceErrorKind,
};

pub use domain::{DailyBar, EconomicEvent, Importance, PriceSeries, Symbol};

pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

pub use error::{DeskError, PivotError, ValidationError};

pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use pivot::{
    analyze, compute_pivot_levels, select_bar, select_display_window, PivotAnalysis, PivotLevel,
    PivotLevels,
};

pub use source::ProviderId;
