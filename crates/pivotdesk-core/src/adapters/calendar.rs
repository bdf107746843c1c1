use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, Weekday};
use tracing::debug;

use crate::data_source::{CalendarRequest, CalendarSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::{EconomicEvent, Importance, ProviderId};

const WEEKLY_FEED: &str = "https://nfs.faireconomy.media/ff_calendar_thisweek.json";

/// Country names accepted by the dashboard and the currency code the feed files them under.
const COUNTRY_CODES: [(&str, &str); 9] = [
    ("united states", "USD"),
    ("euro zone", "EUR"),
    ("united kingdom", "GBP"),
    ("japan", "JPY"),
    ("canada", "CAD"),
    ("australia", "AUD"),
    ("new zealand", "NZD"),
    ("switzerland", "CHF"),
    ("china", "CNY"),
];

/// Economic-calendar adapter over the public weekly JSON feed.
///
/// The feed only covers the current week; a request outside it is rejected
/// as [`SourceErrorKind::InvalidRequest`](crate::SourceErrorKind) rather than
/// answered with an empty list.
/// The default instance is offline and serves a fixed weekly schedule of US
/// releases.
#[derive(Clone)]
pub struct EconomicCalendarAdapter {
    http_client: Option<Arc<dyn HttpClient>>,
    feed_url: String,
    timeout_ms: u64,
}

impl Default for EconomicCalendarAdapter {
    fn default() -> Self {
        Self {
            http_client: None,
            feed_url: String::from(WEEKLY_FEED),
            timeout_ms: 10_000,
        }
    }
}

impl EconomicCalendarAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client: Some(http_client),
            ..Self::default()
        }
    }

    pub fn with_feed_url(mut self, feed_url: impl Into<String>) -> Self {
        self.feed_url = feed_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_real_events(
        &self,
        http_client: &Arc<dyn HttpClient>,
        req: &CalendarRequest,
    ) -> Result<Vec<EconomicEvent>, SourceError> {
        let currency = country_code(&req.country).ok_or_else(|| {
            SourceError::invalid_request(format!(
                "country '{}' is not covered by the economic calendar",
                req.country
            ))
        })?;

        debug!(feed = %self.feed_url, %currency, importance = %req.importance, "requesting economic calendar");
        let request = HttpRequest::get(&self.feed_url).with_timeout_ms(self.timeout_ms);
        let response = http_client.execute(request).await.map_err(|error| {
            SourceError::unavailable(format!("calendar transport error: {}", error.message()))
        })?;

        if response.status == 429 {
            return Err(SourceError::rate_limited("calendar feed rate limited the request"));
        }
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "calendar feed returned status {}",
                response.status
            )));
        }

        let entries: Vec<FeedEntry> = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::internal(format!("failed to parse calendar feed: {e}")))?;

        let mut dated = Vec::with_capacity(entries.len());
        for entry in entries {
            let at = OffsetDateTime::parse(&entry.date, &Rfc3339).map_err(|e| {
                SourceError::internal(format!("invalid calendar date '{}': {e}", entry.date))
            })?;
            dated.push((at, entry));
        }

        if let Some((first, last)) = feed_coverage(dated.iter().map(|(at, _)| at.date())) {
            if req.to < first || req.from > last {
                return Err(SourceError::invalid_request(format!(
                    "economic calendar feed only covers {first}..{last}"
                )));
            }
        }

        let mut events = Vec::new();
        for (at, entry) in dated {
            if !entry.country.eq_ignore_ascii_case(currency) {
                continue;
            }
            let Some(importance) = parse_impact(&entry.impact) else {
                continue;
            };
            if importance != req.importance || !req.contains(at.date()) {
                continue;
            }

            events.push(EconomicEvent {
                date: at.date(),
                time: at.time().format(format_description!("[hour]:[minute]")).ok(),
                event: entry.title,
                importance,
                actual: non_blank(entry.actual),
                forecast: non_blank(entry.forecast),
                previous: non_blank(entry.previous),
            });
        }

        Ok(events)
    }

    fn offline_events(&self, req: &CalendarRequest) -> Vec<EconomicEvent> {
        if country_code(&req.country) != Some("USD") {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut day = req.from;
        while day <= req.to {
            for release in OFFLINE_SCHEDULE {
                if release.weekday == day.weekday() && release.importance == req.importance {
                    events.push(EconomicEvent {
                        date: day,
                        time: Some(release.time.to_owned()),
                        event: release.event.to_owned(),
                        importance: release.importance,
                        actual: None,
                        forecast: Some(release.forecast.to_owned()),
                        previous: Some(release.previous.to_owned()),
                    });
                }
            }
            day = match day.next_day() {
                Some(next) => next,
                None => break,
            };
        }
        events
    }
}

impl CalendarSource for EconomicCalendarAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Faireconomy
    }

    fn events<'a>(
        &'a self,
        req: CalendarRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<EconomicEvent>, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            match &self.http_client {
                Some(http_client) => self.fetch_real_events(http_client, &req).await,
                None => Ok(self.offline_events(&req)),
            }
        })
    }
}

/// Resolve a country name (or a currency code) to the feed's currency code.
pub fn country_code(country: &str) -> Option<&'static str> {
    let wanted = country.trim().to_ascii_lowercase();
    COUNTRY_CODES
        .iter()
        .find(|(name, code)| *name == wanted || code.eq_ignore_ascii_case(&wanted))
        .map(|(_, code)| *code)
}

/// Sunday-to-Saturday weeks spanned by the feed's entries, or `None` for an
/// empty feed.
fn feed_coverage(dates: impl Iterator<Item = Date>) -> Option<(Date, Date)> {
    let (min, max) = dates.fold(None, |range: Option<(Date, Date)>, date| match range {
        Some((min, max)) => Some((min.min(date), max.max(date))),
        None => Some((date, date)),
    })?;

    let first = min
        .checked_sub(Duration::days(i64::from(min.weekday().number_days_from_sunday())))
        .unwrap_or(min);
    let last = max
        .checked_add(Duration::days(i64::from(6 - max.weekday().number_days_from_sunday())))
        .unwrap_or(max);
    Some((first, last))
}

fn parse_impact(impact: &str) -> Option<Importance> {
    // "Holiday" and "Non-Economic" rows carry no importance
    impact.parse().ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
struct FeedEntry {
    title: String,
    country: String,
    date: String,
    impact: String,
    #[serde(default)]
    actual: Option<String>,
    #[serde(default)]
    forecast: Option<String>,
    #[serde(default)]
    previous: Option<String>,
}

struct OfflineRelease {
    weekday: Weekday,
    time: &'static str,
    event: &'static str,
    importance: Importance,
    forecast: &'static str,
    previous: &'static str,
}

const OFFLINE_SCHEDULE: [OfflineRelease; 8] = [
    OfflineRelease {
        weekday: Weekday::Monday,
        time: "10:00",
        event: "ISM Manufacturing PMI",
        importance: Importance::High,
        forecast: "49.2",
        previous: "48.7",
    },
    OfflineRelease {
        weekday: Weekday::Tuesday,
        time: "10:00",
        event: "JOLTS Job Openings",
        importance: Importance::Medium,
        forecast: "8.75M",
        previous: "8.79M",
    },
    OfflineRelease {
        weekday: Weekday::Wednesday,
        time: "08:30",
        event: "CPI m/m",
        importance: Importance::High,
        forecast: "0.2%",
        previous: "0.1%",
    },
    OfflineRelease {
        weekday: Weekday::Wednesday,
        time: "10:30",
        event: "Crude Oil Inventories",
        importance: Importance::Low,
        forecast: "-1.2M",
        previous: "-5.5M",
    },
    OfflineRelease {
        weekday: Weekday::Thursday,
        time: "08:30",
        event: "Unemployment Claims",
        importance: Importance::Medium,
        forecast: "210K",
        previous: "202K",
    },
    OfflineRelease {
        weekday: Weekday::Thursday,
        time: "08:30",
        event: "PPI m/m",
        importance: Importance::High,
        forecast: "0.1%",
        previous: "0.0%",
    },
    OfflineRelease {
        weekday: Weekday::Friday,
        time: "08:30",
        event: "Non-Farm Employment Change",
        importance: Importance::High,
        forecast: "170K",
        previous: "199K",
    },
    OfflineRelease {
        weekday: Weekday::Friday,
        time: "10:00",
        event: "Prelim UoM Consumer Sentiment",
        importance: Importance::Low,
        forecast: "69.4",
        previous: "69.7",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpResponse};
    use time::macros::date;

    struct CannedHttpClient(Result<HttpResponse, HttpError>);

    impl HttpClient for CannedHttpClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self.0.clone();
            Box::pin(async move { response })
        }
    }

    const FEED_BODY: &str = r#"[
        {"title":"CPI m/m","country":"USD","date":"2024-01-11T08:30:00-05:00","impact":"High","forecast":"0.2%","previous":"0.1%"},
        {"title":"Unemployment Claims","country":"USD","date":"2024-01-11T08:30:00-05:00","impact":"Medium","forecast":"210K","previous":"202K"},
        {"title":"German Prelim GDP","country":"EUR","date":"2024-01-11T04:00:00-05:00","impact":"High","forecast":"-0.3%","previous":"1.8%"},
        {"title":"PPI m/m","country":"USD","date":"2024-01-12T08:30:00-05:00","impact":"High","actual":"-0.1%","forecast":"0.1%","previous":"0.0%"},
        {"title":"Bank Holiday","country":"USD","date":"2024-01-15T00:00:00-05:00","impact":"Holiday","forecast":"","previous":""},
        {"title":"Empire State Manufacturing Index","country":"USD","date":"2024-01-16T08:30:00-05:00","impact":"High","forecast":"-5.0","previous":"-14.5"}
    ]"#;

    fn adapter(response: Result<HttpResponse, HttpError>) -> EconomicCalendarAdapter {
        EconomicCalendarAdapter::with_http_client(Arc::new(CannedHttpClient(response)))
    }

    #[test]
    fn resolves_country_names_and_codes() {
        assert_eq!(country_code("United States"), Some("USD"));
        assert_eq!(country_code("usd"), Some("USD"));
        assert_eq!(country_code(" Euro Zone "), Some("EUR"));
        assert_eq!(country_code("Atlantis"), None);
    }

    #[tokio::test]
    async fn filters_feed_by_country_importance_and_range() {
        let calendar = adapter(Ok(HttpResponse::ok_json(FEED_BODY)));
        let request = CalendarRequest::for_day(date!(2024 - 01 - 11), "United States", Importance::High)
            .expect("valid request");

        let events = calendar.events(request).await.expect("feed should parse");
        let titles: Vec<&str> = events.iter().map(|event| event.event.as_str()).collect();
        assert_eq!(titles, vec!["CPI m/m", "PPI m/m"]);

        assert_eq!(events[0].time.as_deref(), Some("08:30"));
        assert_eq!(events[0].actual, None);
        assert_eq!(events[1].date, date!(2024 - 01 - 12));
        assert_eq!(events[1].actual.as_deref(), Some("-0.1%"));
    }

    #[tokio::test]
    async fn unsupported_country_is_an_invalid_request() {
        let calendar = adapter(Ok(HttpResponse::ok_json(FEED_BODY)));
        let request = CalendarRequest::for_day(date!(2024 - 01 - 11), "Atlantis", Importance::High)
            .expect("valid request");

        let error = calendar.events(request).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn feed_failures_surface_as_source_errors() {
        let request = CalendarRequest::for_day(date!(2024 - 01 - 11), "United States", Importance::High)
            .expect("valid request");

        let down = adapter(Err(HttpError::new("connection refused")));
        let error = down.events(request.clone()).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);

        let malformed = adapter(Ok(HttpResponse::ok_json("<html>maintenance</html>")));
        let error = malformed.events(request).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Internal);
    }

    #[test]
    fn feed_coverage_spans_whole_weeks() {
        let dates = [date!(2024 - 01 - 11), date!(2024 - 01 - 09), date!(2024 - 01 - 12)];
        assert_eq!(
            feed_coverage(dates.into_iter()),
            Some((date!(2024 - 01 - 07), date!(2024 - 01 - 13)))
        );
        assert_eq!(feed_coverage(std::iter::empty()), None);
    }

    #[tokio::test]
    async fn request_outside_the_feed_week_is_rejected() {
        let calendar = adapter(Ok(HttpResponse::ok_json(FEED_BODY)));
        let request = CalendarRequest::for_day(date!(2023 - 06 - 14), "United States", Importance::High)
            .expect("valid request");

        let error = calendar.events(request).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
        assert_eq!(
            error.message(),
            "economic calendar feed only covers 2024-01-07..2024-01-20"
        );
    }

    #[tokio::test]
    async fn offline_schedule_follows_weekdays() {
        let calendar = EconomicCalendarAdapter::default();
        // Thursday and Friday
        let request = CalendarRequest::for_day(date!(2024 - 01 - 11), "United States", Importance::High)
            .expect("valid request");

        let events = calendar.events(request).await.expect("offline events");
        let titles: Vec<&str> = events.iter().map(|event| event.event.as_str()).collect();
        assert_eq!(titles, vec!["PPI m/m", "Non-Farm Employment Change"]);

        let elsewhere = CalendarRequest::for_day(date!(2024 - 01 - 11), "Japan", Importance::High)
            .expect("valid request");
        assert!(calendar.events(elsewhere).await.expect("offline events").is_empty());
    }
}
