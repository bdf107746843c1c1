//! Behavior-driven tests for the dashboard service.
//!
//! The pivot section and the calendar section must fail independently: one
//! collaborator's error becomes a notice and never hides the other section.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use pivotdesk_core::{
    CalendarRequest, CalendarSource, DailyBar, DailyBarsRequest, Dashboard, DashboardConfig,
    DeskError, EconomicCalendarAdapter, EconomicEvent, Envelope, EnvelopeMeta, FetchWindow,
    HttpClient, HttpError, HttpRequest, HttpResponse, Importance, NoticeLevel, PageRequest, PivotError, PriceSeries, PriceSource, ProviderId,
    SourceError, YahooAdapter,
};
use time::macros::date;

struct FixedPrices(Vec<DailyBar>);

impl PriceSource for FixedPrices {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn daily_bars<'a>(
        &'a self,
        req: DailyBarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move { Ok(PriceSeries::from_unordered(req.symbol, self.0.clone())) })
    }
}

struct DownPrices;

impl PriceSource for DownPrices {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn daily_bars<'a>(
        &'a self,
        _req: DailyBarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async { Err(SourceError::unavailable("chart service timed out")) })
    }
}

struct DownCalendar;

impl CalendarSource for DownCalendar {
    fn id(&self) -> ProviderId {
        ProviderId::Faireconomy
    }

    fn events<'a>(
        &'a self,
        _req: CalendarRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<EconomicEvent>, SourceError>> + Send + 'a>> {
        Box::pin(async { Err(SourceError::unavailable("calendar feed unreachable")) })
    }
}

/// Transport that serves a one-entry weekly calendar feed.
struct WeeklyFeed;

impl HttpClient for WeeklyFeed {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async {
            Ok(HttpResponse::ok_json(
                r#"[{"title":"CPI m/m","country":"USD","date":"2024-01-11T08:30:00-05:00","impact":"High","forecast":"0.2%","previous":"0.1%"}]"#,
            ))
        })
    }
}

fn offline_calendar() -> Arc<dyn CalendarSource> {
    Arc::new(EconomicCalendarAdapter::default())
}

fn requested(ticker: &str, date: time::Date, econ_date: time::Date) -> PageRequest {
    PageRequest {
        ticker: ticker.to_owned(),
        date,
        analyze: true,
        econ_date,
        importance: Importance::High,
    }
}

// =============================================================================
// Section independence
// =============================================================================

#[tokio::test]
async fn when_calendar_fails_the_pivot_analysis_still_renders() {
    // Given
    let dashboard = Dashboard::new(
        Arc::new(YahooAdapter::default()),
        Arc::new(DownCalendar),
        DashboardConfig::default(),
    )
    .with_today(date!(2024 - 01 - 10));

    // When
    let page = dashboard
        .page(requested("spy", date!(2024 - 01 - 09), date!(2024 - 01 - 10)))
        .await;

    // Then
    let analysis = page.analysis.as_ref().expect("analysis survives calendar failure");
    assert_eq!(analysis.symbol.as_str(), "SPY");
    assert!(page.events.is_empty());
    assert!(page.analysis_notices.is_empty());
    assert_eq!(page.calendar_notices.len(), 1);
    assert_eq!(page.calendar_notices[0].level, NoticeLevel::Warning);
    assert!(page.calendar_notices[0].message.contains("calendar feed unreachable"));
}

#[tokio::test]
async fn when_prices_fail_the_calendar_still_renders() {
    let dashboard = Dashboard::new(Arc::new(DownPrices), offline_calendar(), DashboardConfig::default())
        .with_today(date!(2024 - 01 - 10));

    let page = dashboard
        .page(requested("SPY", date!(2024 - 01 - 09), date!(2024 - 01 - 10)))
        .await;

    assert!(page.analysis.is_none());
    assert_eq!(page.analysis_notices.len(), 1);
    assert_eq!(page.analysis_notices[0].level, NoticeLevel::Error);
    assert!(page.analysis_notices[0].message.contains("chart service timed out"));
    assert!(!page.events.is_empty());
    assert!(page.calendar_notices.is_empty());
}

#[tokio::test]
async fn when_date_is_a_weekend_the_notice_asks_for_a_business_day() {
    let dashboard = Dashboard::offline(DashboardConfig::default()).with_today(date!(2024 - 01 - 10));

    let page = dashboard
        .page(requested("SPY", date!(2024 - 01 - 06), date!(2024 - 01 - 10)))
        .await;

    assert!(page.analysis.is_none());
    assert_eq!(
        page.analysis_notices[0].message,
        "No market data for 06/01/2024. Check that it is a business day."
    );
}

#[tokio::test]
async fn when_provider_has_one_bar_the_ticker_has_insufficient_data() {
    let single = vec![DailyBar::checked(date!(2024 - 01 - 09), 10.0, 11.0, 9.0, 10.5, None)
        .expect("valid")];
    let dashboard = Dashboard::new(
        Arc::new(FixedPrices(single)),
        offline_calendar(),
        DashboardConfig::default(),
    );

    let err = dashboard
        .analyze("SPY", date!(2024 - 01 - 09))
        .await
        .expect_err("one bar is not enough");

    assert!(matches!(
        err,
        DeskError::Pivot(PivotError::InsufficientHistory { available: 1, .. })
    ));
}

#[tokio::test]
async fn when_upstream_bar_is_malformed_the_error_is_data_integrity() {
    let bars = vec![
        DailyBar::checked(date!(2024 - 01 - 08), 10.0, 11.0, 9.0, 10.5, None).expect("valid"),
        // close above high
        DailyBar::new(date!(2024 - 01 - 09), 10.0, 11.0, 9.0, 12.0, None).expect("finite"),
    ];
    let dashboard = Dashboard::new(Arc::new(FixedPrices(bars)), offline_calendar(), DashboardConfig::default());

    let err = dashboard
        .analyze("SPY", date!(2024 - 01 - 09))
        .await
        .expect_err("must fail");

    assert_eq!(err.code(), "pivot.data_integrity");
}

#[tokio::test]
async fn when_ticker_is_invalid_the_error_is_validation() {
    let dashboard = Dashboard::offline(DashboardConfig::default());

    let err = dashboard
        .analyze("   ", date!(2024 - 01 - 09))
        .await
        .expect_err("blank ticker");

    assert!(matches!(err, DeskError::Validation(_)));
}

// =============================================================================
// Calendar section
// =============================================================================

#[tokio::test]
async fn when_no_events_match_an_info_notice_is_shown() {
    // Given: the offline schedule has no low-importance releases on Monday or Tuesday
    let dashboard = Dashboard::offline(DashboardConfig::default()).with_today(date!(2024 - 01 - 08));
    let mut request = dashboard.default_request();
    request.econ_date = date!(2024 - 01 - 08);
    request.importance = Importance::Low;

    // When
    let page = dashboard.page(request).await;

    // Then
    assert!(page.events.is_empty());
    assert_eq!(page.calendar_notices.len(), 1);
    assert_eq!(page.calendar_notices[0].level, NoticeLevel::Info);
    assert!(page.calendar_notices[0].message.contains("United States"));
}

#[tokio::test]
async fn when_calendar_is_fetched_events_are_in_chronological_order() {
    let dashboard = Dashboard::offline(DashboardConfig::default());

    let events = dashboard
        .calendar(date!(2024 - 01 - 11), Importance::High)
        .await
        .expect("offline calendar");

    assert!(events.windows(2).all(|pair| pair[0].date <= pair[1].date));
    assert!(events
        .iter()
        .all(|event| event.date == date!(2024 - 01 - 11) || event.date == date!(2024 - 01 - 12)));
}

// =============================================================================
// Configuration and envelopes
// =============================================================================

#[tokio::test]
async fn when_fetch_window_is_five_days_the_display_window_shrinks() {
    let config = DashboardConfig {
        fetch_window: FetchWindow::FiveDays,
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::offline(config).with_today(date!(2024 - 01 - 10));

    let analysis = dashboard
        .analyze("QQQ", date!(2024 - 01 - 08))
        .await
        .expect("monday is inside a five-day window");

    // Fri 5th, Mon 8th, Tue 9th, Wed 10th
    assert_eq!(analysis.window.len(), 4);
}

#[tokio::test]
async fn when_analysis_is_wrapped_the_envelope_names_its_source() {
    let dashboard = Dashboard::offline(DashboardConfig::default()).with_today(date!(2024 - 01 - 10));

    let timed = dashboard
        .analyze_timed("SPY", date!(2024 - 01 - 10))
        .await
        .expect("offline");
    let meta = EnvelopeMeta::new(vec![timed.source], timed.latency_ms).expect("valid meta");
    let envelope = Envelope::success(meta, timed.value);
    let json = serde_json::to_value(&envelope).expect("serializable");

    assert_eq!(json["meta"]["source_chain"][0], "yahoo");
    assert_eq!(json["data"]["symbol"], "SPY");
    assert_eq!(json["data"]["date"], "2024-01-10");
    assert!(json["data"]["levels"]["pivot"].is_f64());
}

#[tokio::test]
async fn when_calendar_date_is_outside_the_feed_the_page_warns_instead_of_showing_no_events() {
    // Given
    let calendar = EconomicCalendarAdapter::with_http_client(Arc::new(WeeklyFeed));
    let dashboard = Dashboard::new(
        Arc::new(YahooAdapter::default()),
        Arc::new(calendar),
        DashboardConfig::default(),
    )
    .with_today(date!(2024 - 01 - 10));
    let mut request = PageRequest::defaults(date!(2024 - 01 - 10));
    request.econ_date = date!(2023 - 06 - 14);

    // When
    let page = dashboard.page(request).await;

    // Then
    assert!(page.events.is_empty());
    assert_eq!(page.calendar_notices.len(), 1);
    assert_eq!(page.calendar_notices[0].level, NoticeLevel::Warning);
    assert!(page.calendar_notices[0].message.contains("only covers"));
}
