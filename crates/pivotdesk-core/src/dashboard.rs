//! Request-scoped orchestration of the price source, the pivot calculator and
//! the economic calendar.
//!
//! [`Dashboard::page`] never fails: collaborator errors become [`Notice`]s so
//! the pivot section and the calendar section render independently.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::{debug, warn};

use crate::adapters::{EconomicCalendarAdapter, YahooAdapter};
use crate::config::DashboardConfig;
use crate::data_source::{
    CalendarRequest, CalendarSource, DailyBarsRequest, PriceSource, SourceError,
};
use crate::domain::dates::{format_dmy, today_utc};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::pivot::{analyze, PivotAnalysis};
use crate::{DeskError, EconomicEvent, Importance, PivotError, ProviderId, Symbol};

pub const DEFAULT_TICKER: &str = "SPY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
}

impl NoticeLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// User-facing message shown next to the section it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Inputs of one page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub ticker: String,
    pub date: Date,
    /// The pivot section is only computed once the user asked for it.
    pub analyze: bool,
    pub econ_date: Date,
    pub importance: Importance,
}

impl PageRequest {
    /// Form defaults: `SPY` analysed for yesterday, calendar for today.
    pub fn defaults(today: Date) -> Self {
        Self {
            ticker: String::from(DEFAULT_TICKER),
            date: today.previous_day().unwrap_or(today),
            analyze: false,
            econ_date: today,
            importance: Importance::default(),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::defaults(today_utc())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPage {
    pub request: PageRequest,
    pub analysis: Option<PivotAnalysis>,
    pub events: Vec<EconomicEvent>,
    /// Messages about the pivot section.
    pub analysis_notices: Vec<Notice>,
    /// Messages about the calendar section.
    pub calendar_notices: Vec<Notice>,
}

/// Analysis plus the bookkeeping the envelope needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub source: ProviderId,
    pub latency_ms: u64,
}

pub struct Dashboard {
    prices: Arc<dyn PriceSource>,
    calendar: Arc<dyn CalendarSource>,
    config: DashboardConfig,
    today: Option<Date>,
}

impl Dashboard {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        calendar: Arc<dyn CalendarSource>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            prices,
            calendar,
            config,
            today: None,
        }
    }

    /// Deterministic sources; no network access.
    pub fn offline(config: DashboardConfig) -> Self {
        Self::new(
            Arc::new(YahooAdapter::default()),
            Arc::new(EconomicCalendarAdapter::default()),
            config,
        )
    }

    /// Yahoo prices and the weekly economic-calendar feed over reqwest.
    pub fn live(config: DashboardConfig) -> Self {
        let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
        let prices =
            YahooAdapter::with_http_client(Arc::clone(&http_client)).with_timeout_ms(config.timeout_ms);
        let calendar =
            EconomicCalendarAdapter::with_http_client(http_client).with_timeout_ms(config.timeout_ms);
        Self::new(Arc::new(prices), Arc::new(calendar), config)
    }

    /// Pin "today", which anchors the fetch window and the form defaults.
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn today(&self) -> Date {
        self.today.unwrap_or_else(today_utc)
    }

    pub fn default_request(&self) -> PageRequest {
        PageRequest::defaults(self.today())
    }

    pub fn price_source(&self) -> ProviderId {
        self.prices.id()
    }

    pub fn calendar_source(&self) -> ProviderId {
        self.calendar.id()
    }

    /// Fetch the recent series for `ticker` and analyse the session dated `date`.
    pub async fn analyze(&self, ticker: &str, date: Date) -> Result<PivotAnalysis, DeskError> {
        self.analyze_timed(ticker, date).await.map(|timed| timed.value)
    }

    pub async fn analyze_timed(
        &self,
        ticker: &str,
        date: Date,
    ) -> Result<Timed<PivotAnalysis>, DeskError> {
        let started = Instant::now();
        let symbol = Symbol::parse(ticker)?;
        let request = DailyBarsRequest::new(symbol, self.config.fetch_window, self.today());
        debug!(
            symbol = %request.symbol,
            window = %request.window,
            end = %request.end,
            source = %self.prices.id(),
            "fetching daily bars"
        );

        let series = self.prices.daily_bars(request).await?;
        let analysis = analyze(&series, date, self.config.max_display_bars)?;

        Ok(Timed {
            value: analysis,
            source: self.prices.id(),
            latency_ms: elapsed_ms(started),
        })
    }

    /// Events for `date` and the following day in the configured country.
    pub async fn calendar(
        &self,
        date: Date,
        importance: Importance,
    ) -> Result<Vec<EconomicEvent>, SourceError> {
        self.calendar_timed(date, importance)
            .await
            .map(|timed| timed.value)
    }

    pub async fn calendar_timed(
        &self,
        date: Date,
        importance: Importance,
    ) -> Result<Timed<Vec<EconomicEvent>>, SourceError> {
        let started = Instant::now();
        let request = CalendarRequest::for_day(date, self.config.calendar_country.as_str(), importance)?;
        let mut events = self.calendar.events(request).await?;
        events.sort_by(|a, b| (a.date, &a.time).cmp(&(b.date, &b.time)));

        Ok(Timed {
            value: events,
            source: self.calendar.id(),
            latency_ms: elapsed_ms(started),
        })
    }

    pub async fn page(&self, request: PageRequest) -> DashboardPage {
        let mut analysis = None;
        let mut analysis_notices = Vec::new();

        if request.analyze {
            match self.analyze(&request.ticker, request.date).await {
                Ok(result) => analysis = Some(result),
                Err(error) => {
                    warn!(ticker = %request.ticker, date = %request.date, code = error.code(), %error, "pivot analysis failed");
                    analysis_notices.push(Notice::error(analysis_message(&request, &error)));
                }
            }
        }

        let mut events = Vec::new();
        let mut calendar_notices = Vec::new();
        match self.calendar(request.econ_date, request.importance).await {
            Ok(found) if found.is_empty() => {
                calendar_notices.push(Notice::info(format!(
                    "No relevant events for {} on the selected date.",
                    self.config.calendar_country
                )));
            }
            Ok(found) => events = found,
            Err(error) => {
                warn!(date = %request.econ_date, code = error.code(), %error, "economic calendar failed");
                calendar_notices.push(Notice::warning(format!(
                    "Error fetching the economic calendar: {}",
                    error.message()
                )));
            }
        }

        DashboardPage {
            request,
            analysis,
            events,
            analysis_notices,
            calendar_notices,
        }
    }
}

fn analysis_message(request: &PageRequest, error: &DeskError) -> String {
    match error {
        DeskError::Pivot(PivotError::InsufficientHistory { .. }) => {
            String::from("Insufficient data for this ticker.")
        }
        DeskError::Pivot(PivotError::NoBarForDate { date }) => format!(
            "No market data for {}. Check that it is a business day.",
            format_dmy(*date)
        ),
        DeskError::Pivot(PivotError::DataIntegrity(cause)) => format!(
            "Market data for {} failed validation: {cause}",
            request.ticker.trim().to_ascii_uppercase()
        ),
        DeskError::Validation(cause) => format!("Invalid ticker: {cause}"),
        DeskError::Source(cause) => format!("Could not fetch prices: {}", cause.message()),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
