use std::fs;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use pivotdesk_core::domain::dates::parse_date;
use pivotdesk_core::{Dashboard, DeskError, EnvelopeError, PivotAnalysis};
use pivotdesk_web::render_chart;

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::analysis_table;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct AnalyzeData<'a> {
    #[serde(flatten)]
    analysis: &'a PivotAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart: Option<String>,
}

pub async fn run(args: &AnalyzeArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let date = match &args.date {
        Some(raw) => parse_date(raw)?,
        None => dashboard.default_request().date,
    };

    let timed = match dashboard.analyze_timed(&args.ticker, date).await {
        Ok(timed) => timed,
        Err(DeskError::Validation(error)) => return Err(error.into()),
        Err(DeskError::Source(error)) => return Err(error.into()),
        Err(DeskError::Pivot(error)) => {
            let source = dashboard.price_source();
            let envelope_error = EnvelopeError::new(error.code(), error.to_string())?
                .with_retryable(false)
                .with_source(source);
            return Ok(CommandResult::ok(Value::Null, vec![source])
                .with_errors(vec![envelope_error])
                .with_table(format!("{error}\n")));
        }
    };

    let chart = match &args.chart {
        Some(path) => {
            fs::write(path, render_chart(&timed.value, dashboard.config().chart_axis))?;
            info!(path = %path.display(), "wrote candlestick chart");
            Some(path.display().to_string())
        }
        None => None,
    };

    let data = serde_json::to_value(AnalyzeData {
        analysis: &timed.value,
        chart,
    })?;

    Ok(CommandResult::ok(data, vec![timed.source])
        .with_latency(timed.latency_ms)
        .with_table(analysis_table(&timed.value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivotdesk_core::DashboardConfig;
    use tempfile::tempdir;
    use time::macros::date;

    fn dashboard() -> Dashboard {
        Dashboard::offline(DashboardConfig::default()).with_today(date!(2024 - 01 - 10))
    }

    #[tokio::test]
    async fn writes_chart_and_reports_levels() {
        let dir = tempdir().expect("temp dir");
        let chart_path = dir.path().join("spy.svg");
        let args = AnalyzeArgs {
            ticker: String::from("spy"),
            date: Some(String::from("2024-01-09")),
            chart: Some(chart_path.clone()),
        };

        let result = run(&args, &dashboard()).await.expect("offline analysis");

        let svg = fs::read_to_string(&chart_path).expect("chart written");
        assert!(svg.starts_with("<svg"));
        assert_eq!(result.data["symbol"], "SPY");
        assert_eq!(result.data["chart"], chart_path.display().to_string());
        assert!(result.data["levels"]["pivot"].is_f64());
        assert!(result.errors.is_empty());
        assert!(result.table.contains("SPY on 09-Jan-2024"));
    }

    #[tokio::test]
    async fn weekend_date_is_reported_in_the_envelope() {
        let args = AnalyzeArgs {
            ticker: String::from("SPY"),
            date: Some(String::from("2024-01-07")),
            chart: None,
        };

        let result = run(&args, &dashboard()).await.expect("reported, not raised");

        assert!(result.data.is_null());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "pivot.no_market_data");
    }

    #[tokio::test]
    async fn malformed_date_is_a_validation_error() {
        let args = AnalyzeArgs {
            ticker: String::from("SPY"),
            date: Some(String::from("07/01/2024")),
            chart: None,
        };

        let err = run(&args, &dashboard()).await.err().expect("must fail");
        assert_eq!(err.exit_code(), 2);
    }
}
