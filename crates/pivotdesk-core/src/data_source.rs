//! Data source traits and request/response types.
//!
//! | Source | Request | Response |
//! |--------|---------|----------|
//! | [`PriceSource`] | [`DailyBarsRequest`] | [`PriceSeries`] |
//! | [`CalendarSource`] | [`CalendarRequest`] | `Vec<EconomicEvent>` |
//!
//! Failures are reported as [`SourceError`]; nothing in this crate retries
//! them; the dashboard turns them into user-facing notices.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use time::{Date, Duration};

use crate::config::FetchWindow;
use crate::{EconomicEvent, Importance, PriceSeries, ProviderId, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Internal,
}

/// Structured error returned by price and calendar sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Daily bars for `symbol` covering `window` calendar days up to and including `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyBarsRequest {
    pub symbol: Symbol,
    pub window: FetchWindow,
    pub end: Date,
}

impl DailyBarsRequest {
    pub fn new(symbol: Symbol, window: FetchWindow, end: Date) -> Self {
        Self {
            symbol,
            window,
            end,
        }
    }

    /// First calendar day of the lookback.
    pub fn start(&self) -> Date {
        self.end - Duration::days(self.window.days())
    }
}

/// Economic events dated within `from..=to` for one country and importance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarRequest {
    pub from: Date,
    pub to: Date,
    pub country: String,
    pub importance: Importance,
}

impl CalendarRequest {
    pub fn new(
        from: Date,
        to: Date,
        country: impl Into<String>,
        importance: Importance,
    ) -> Result<Self, SourceError> {
        if to < from {
            return Err(SourceError::invalid_request(format!(
                "calendar range ends ({to}) before it starts ({from})"
            )));
        }
        let country = country.into();
        if country.trim().is_empty() {
            return Err(SourceError::invalid_request(
                "calendar request must name a country",
            ));
        }
        Ok(Self {
            from,
            to,
            country,
            importance,
        })
    }

    /// The selected day and the one after it.
    pub fn for_day(
        day: Date,
        country: impl Into<String>,
        importance: Importance,
    ) -> Result<Self, SourceError> {
        let to = day.next_day().unwrap_or(day);
        Self::new(day, to, country, importance)
    }

    pub fn contains(&self, date: Date) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Provider of daily OHLC history.
///
/// An unknown ticker or a window without sessions is an empty series, not an
/// error; callers decide whether the history is sufficient.
pub trait PriceSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn daily_bars<'a>(
        &'a self,
        req: DailyBarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>>;
}

/// Provider of economic-calendar events.
pub trait CalendarSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn events<'a>(
        &'a self,
        req: CalendarRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<EconomicEvent>, SourceError>> + Send + 'a>>;
}
