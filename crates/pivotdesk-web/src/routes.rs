use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, Method};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use pivotdesk_core::domain::dates::parse_date;
use pivotdesk_core::{
    Dashboard, EconomicEvent, Envelope, EnvelopeMeta, Importance, PageRequest, PivotAnalysis,
};

use crate::chart::render_chart;
use crate::error::WebError;
use crate::page::render_page;

#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<Dashboard>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }
}

/// Query string of the dashboard page and the API endpoints. Blank values
/// fall back to the form defaults.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub ticker: Option<String>,
    pub date: Option<String>,
    pub analyze: Option<String>,
    pub econ_date: Option<String>,
    pub importance: Option<String>,
}

impl DashboardParams {
    pub fn page_request(&self, defaults: PageRequest) -> Result<PageRequest, WebError> {
        Ok(PageRequest {
            ticker: present(&self.ticker).map_or(defaults.ticker, str::to_owned),
            date: present(&self.date).map(parse_date).transpose()?.unwrap_or(defaults.date),
            analyze: present(&self.analyze).is_some_and(is_truthy),
            econ_date: present(&self.econ_date)
                .map(parse_date)
                .transpose()?
                .unwrap_or(defaults.econ_date),
            importance: present(&self.importance)
                .map(str::parse::<Importance>)
                .transpose()?
                .unwrap_or(defaults.importance),
        })
    }
}

/// `/api/calendar` names its day `date`.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarParams {
    pub date: Option<String>,
    pub importance: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chart.svg", get(chart_svg))
        .route("/api/pivots", get(api_pivots))
        .route("/api/calendar", get(api_calendar))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .with_state(state)
}

async fn index(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Html<String>, WebError> {
    let dashboard = state.dashboard();
    let request = params.page_request(dashboard.default_request())?;
    let page = dashboard.page(request).await;
    Ok(Html(render_page(&page, dashboard.config().chart_axis)))
}

async fn chart_svg(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, WebError> {
    let dashboard = state.dashboard();
    let request = params.page_request(dashboard.default_request())?;
    let analysis = dashboard.analyze(&request.ticker, request.date).await?;
    let svg = render_chart(&analysis, dashboard.config().chart_axis);
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

async fn api_pivots(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<Envelope<PivotAnalysis>>, WebError> {
    let dashboard = state.dashboard();
    let request = params.page_request(dashboard.default_request())?;
    let timed = dashboard.analyze_timed(&request.ticker, request.date).await?;
    let meta = EnvelopeMeta::new(vec![timed.source], timed.latency_ms)?;
    Ok(Json(Envelope::success(meta, timed.value)))
}

async fn api_calendar(
    State(state): State<AppState>,
    Query(params): Query<CalendarParams>,
) -> Result<Json<Envelope<Vec<EconomicEvent>>>, WebError> {
    let dashboard = state.dashboard();
    let date = present(&params.date)
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| dashboard.today());
    let importance = present(&params.importance)
        .map(str::parse::<Importance>)
        .transpose()?
        .unwrap_or_default();

    let timed = dashboard.calendar_timed(date, importance).await?;
    let mut meta = EnvelopeMeta::new(vec![timed.source], timed.latency_ms)?;
    if timed.value.is_empty() {
        meta.push_warning(format!(
            "no {importance} importance events for {} on the selected date",
            dashboard.config().calendar_country
        ));
    }
    Ok(Json(Envelope::success(meta, timed.value)))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let dashboard = state.dashboard();
    Json(json!({
        "status": "ok",
        "price_source": dashboard.price_source(),
        "calendar_source": dashboard.calendar_source(),
    }))
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes"
    )
}
