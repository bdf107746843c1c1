//! CLI argument definitions for pivotdesk.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `analyze` | Pivot levels and OHLC values for one ticker and day |
//! | `calendar` | Economic-calendar events for a day and the next |
//! | `serve` | Run the web dashboard |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use deterministic offline data |
//! | `--timeout-ms` | `10000` | Upstream request timeout |
//! | `--fetch-window` | `7d` | Price lookback (5d, 7d) |
//! | `--chart-axis` | `categorical` | Chart x axis (categorical, date) |
//! | `--max-bars` | `10` | Bars drawn on the chart |
//! | `--country` | `United States` | Economic-calendar country |
//! | `--log-json` | `false` | Emit JSON log lines on stderr |
//!
//! Unset options fall back to the `PIVOTDESK_*` environment variables, then
//! to the built-in defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use pivotdesk_core::{ChartAxis, DashboardConfig, FetchWindow, Importance, ValidationError};

/// Pivot-point dashboard for daily OHLC data.
#[derive(Debug, Parser)]
#[command(
    name = "pivotdesk",
    author,
    version,
    about = "Pivot-point support/resistance levels, candlestick charts and an economic calendar",
    long_about = "pivotdesk fetches recent daily prices for a ticker, computes classic floor-trader \
pivot levels (Pivot, R1, R2, S1, S2) for a chosen session and shows the economic calendar \
around a chosen day.\n\
\n\
Use 'pivotdesk <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Serve deterministic offline data instead of calling the providers.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Upstream request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Calendar days of price history to fetch (5d or 7d).
    #[arg(long, global = true)]
    pub fetch_window: Option<FetchWindow>,

    /// Chart x axis: evenly spaced bars or calendar-day spacing.
    #[arg(long, global = true)]
    pub chart_axis: Option<ChartAxis>,

    /// Maximum number of weekday bars drawn on the chart.
    #[arg(long, global = true)]
    pub max_bars: Option<usize>,

    /// Country whose economic releases are listed.
    #[arg(long, global = true)]
    pub country: Option<String>,

    /// Emit logs as JSON lines (stderr).
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Environment-derived configuration with command-line overrides applied.
    pub fn dashboard_config(&self) -> Result<DashboardConfig, ValidationError> {
        let mut config = DashboardConfig::from_env()?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(window) = self.fetch_window {
            config.fetch_window = window;
        }
        if let Some(axis) = self.chart_axis {
            config.chart_axis = axis;
        }
        if let Some(max_bars) = self.max_bars {
            config.max_display_bars = max_bars;
        }
        if let Some(country) = &self.country {
            config.calendar_country = country.trim().to_owned();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute pivot levels for one ticker and trading day.
    ///
    /// # Examples
    ///
    ///   pivotdesk analyze SPY --date 2024-01-05
    ///   pivotdesk analyze aapl --chart aapl.svg --format json --pretty
    Analyze(AnalyzeArgs),

    /// List economic-calendar events for a day and the day after.
    ///
    /// # Examples
    ///
    ///   pivotdesk calendar
    ///   pivotdesk calendar --date 2024-01-11 --importance medium
    Calendar(CalendarArgs),

    /// Serve the interactive dashboard over HTTP.
    ///
    /// # Examples
    ///
    ///   pivotdesk serve --addr 0.0.0.0:8080
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Ticker symbol; trimmed and upper-cased.
    #[arg(default_value = "SPY")]
    pub ticker: String,

    /// Session to analyse (YYYY-MM-DD). Defaults to yesterday.
    #[arg(long)]
    pub date: Option<String>,

    /// Also write the candlestick chart as SVG to this path.
    #[arg(long)]
    pub chart: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// First day of the listing (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<String>,

    /// Importance filter: high, medium or low.
    #[arg(long, default_value = "high")]
    pub importance: Importance,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Socket address to bind.
    #[arg(long, env = "PIVOTDESK_ADDR", default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,
}
