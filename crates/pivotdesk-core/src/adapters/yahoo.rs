use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, OffsetDateTime, Time};
use tracing::debug;

use crate::data_source::{DailyBarsRequest, PriceSource, SourceError};
use crate::domain::dates::is_weekday;
use crate::http_client::{HttpClient, HttpRequest};
use crate::{DailyBar, PriceSeries, ProviderId, Symbol};

const CHART_ENDPOINT: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance daily-bar adapter.
///
/// Built with [`YahooAdapter::with_http_client`] it calls the public chart
/// API; the default instance serves deterministic offline bars (weekdays
/// only) so the dashboard can run without network access.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Option<Arc<dyn HttpClient>>,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: None,
            timeout_ms: 10_000,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client: Some(http_client),
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn is_offline(&self) -> bool {
        self.http_client.is_none()
    }

    async fn fetch_real_bars(
        &self,
        http_client: &Arc<dyn HttpClient>,
        req: &DailyBarsRequest,
    ) -> Result<PriceSeries, SourceError> {
        let endpoint = chart_url(req);
        debug!(symbol = %req.symbol, %endpoint, "requesting yahoo daily chart");

        let request = HttpRequest::get(&endpoint)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        let response = http_client.execute(request).await.map_err(|error| {
            if error.retryable() {
                SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
            } else {
                SourceError::internal(format!("yahoo transport error: {}", error.message()))
            }
        })?;

        // unknown tickers come back as 404 with a chart error payload
        if response.status == 404 {
            if is_not_found_payload(&response.body) {
                debug!(symbol = %req.symbol, "yahoo has no chart for symbol");
                return Ok(PriceSeries::empty(req.symbol.clone()));
            }
            return Err(SourceError::unavailable("yahoo returned status 404"));
        }
        if response.status == 429 {
            return Err(SourceError::rate_limited("yahoo rate limited the chart request"));
        }
        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        parse_chart_response(&req.symbol, &response.body)
    }

    fn fake_bars(&self, req: &DailyBarsRequest) -> Result<PriceSeries, SourceError> {
        let seed = symbol_seed(&req.symbol);
        let mut bars = Vec::new();
        let mut day = req.start();

        while day <= req.end {
            if is_weekday(day) {
                let index = day.to_julian_day() as u64;
                let base = 90.0 + ((seed + index) % 350) as f64 / 10.0;
                let close = if index % 3 == 0 { base - 0.50 } else { base + 0.30 };
                let bar = DailyBar::new(
                    day,
                    base,
                    base + 1.20,
                    base - 0.80,
                    close,
                    Some(20_000 + (index % 100) * 25),
                )
                .map_err(|error| SourceError::internal(error.to_string()))?;
                bars.push(bar);
            }

            day = match day.next_day() {
                Some(next) => next,
                None => break,
            };
        }

        PriceSeries::new(req.symbol.clone(), bars)
            .map_err(|error| SourceError::internal(error.to_string()))
    }
}

impl PriceSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn daily_bars<'a>(
        &'a self,
        req: DailyBarsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            match &self.http_client {
                Some(http_client) => self.fetch_real_bars(http_client, &req).await,
                None => self.fake_bars(&req),
            }
        })
    }
}

fn chart_url(req: &DailyBarsRequest) -> String {
    let period1 = unix_midnight(req.start());
    let period2 = unix_midnight(req.end.next_day().unwrap_or(req.end));

    format!(
        "{CHART_ENDPOINT}/{}?period1={period1}&period2={period2}&interval=1d&events=history",
        urlencoding::encode(req.symbol.as_str()),
    )
}

fn unix_midnight(date: Date) -> i64 {
    date.with_time(Time::MIDNIGHT).assume_utc().unix_timestamp()
}

/// Map a chart payload to a series. Rows with any missing OHLC value are
/// skipped; timestamps are converted to the exchange-local calendar date.
fn parse_chart_response(symbol: &Symbol, body: &str) -> Result<PriceSeries, SourceError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart_response.chart.error {
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error: {} ({})",
            error.description.unwrap_or_default(),
            error.code
        )));
    }

    let Some(result) = chart_response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
    else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };

    let Some(timestamps) = result.timestamp else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::internal("no quote data in yahoo chart"))?;
    let gmt_offset = result.meta.and_then(|meta| meta.gmtoffset).unwrap_or(0);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts_value) in timestamps.iter().enumerate() {
        let local = OffsetDateTime::from_unix_timestamp(ts_value + gmt_offset)
            .map_err(|e| SourceError::internal(format!("invalid timestamp {ts_value}: {e}")))?;

        let (Some(open), Some(high), Some(low), Some(close)) = (
            value_at(&quote.open, i),
            value_at(&quote.high, i),
            value_at(&quote.low, i),
            value_at(&quote.close, i),
        ) else {
            debug!(%symbol, ts = ts_value, "skipping yahoo row with missing prices");
            continue;
        };

        let volume = quote
            .volume
            .get(i)
            .copied()
            .flatten()
            .and_then(|v| u64::try_from(v).ok());

        let bar = DailyBar::new(local.date(), open, high, low, close, volume)
            .map_err(|e| SourceError::internal(format!("yahoo returned an invalid bar: {e}")))?;
        bars.push(bar);
    }

    Ok(PriceSeries::from_unordered(symbol.clone(), bars))
}

fn value_at(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

fn is_not_found_payload(body: &str) -> bool {
    serde_json::from_str::<YahooChartResponse>(body)
        .ok()
        .and_then(|response| response.chart.error)
        .map(|error| error.code.eq_ignore_ascii_case("not found"))
        .unwrap_or(false)
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol
        .as_str()
        .bytes()
        .fold(0_u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(u64::from(byte)))
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: Option<YahooChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}
