//! Dashboard configuration.
//!
//! Values resolve in three layers: [`Default`], then `PIVOTDESK_*` environment
//! variables ([`DashboardConfig::from_env`]), then explicit overrides applied
//! by the CLI.

use std::env;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pivot::DEFAULT_DISPLAY_BARS;
use crate::ValidationError;

pub const ENV_FETCH_WINDOW: &str = "PIVOTDESK_FETCH_WINDOW";
pub const ENV_CHART_AXIS: &str = "PIVOTDESK_CHART_AXIS";
pub const ENV_MAX_BARS: &str = "PIVOTDESK_MAX_BARS";
pub const ENV_CALENDAR_COUNTRY: &str = "PIVOTDESK_CALENDAR_COUNTRY";
pub const ENV_TIMEOUT_MS: &str = "PIVOTDESK_TIMEOUT_MS";

/// Calendar-day lookback requested from the price provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchWindow {
    #[serde(rename = "5d")]
    FiveDays,
    #[default]
    #[serde(rename = "7d")]
    SevenDays,
}

impl FetchWindow {
    pub const fn days(self) -> i64 {
        match self {
            Self::FiveDays => 5,
            Self::SevenDays => 7,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FiveDays => "5d",
            Self::SevenDays => "7d",
        }
    }
}

impl Display for FetchWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchWindow {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "5d" | "5" => Ok(Self::FiveDays),
            "7d" | "7" => Ok(Self::SevenDays),
            other => Err(ValidationError::InvalidFetchWindow {
                value: other.to_owned(),
            }),
        }
    }
}

/// How the chart spaces candles along the x axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartAxis {
    /// Evenly spaced, one slot per bar; weekends leave no gaps.
    #[default]
    Categorical,
    /// Spaced by calendar day.
    Date,
}

impl ChartAxis {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Categorical => "categorical",
            Self::Date => "date",
        }
    }
}

impl Display for ChartAxis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartAxis {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "categorical" => Ok(Self::Categorical),
            "date" => Ok(Self::Date),
            other => Err(ValidationError::InvalidChartAxis {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub fetch_window: FetchWindow,
    pub chart_axis: ChartAxis,
    pub max_display_bars: usize,
    pub calendar_country: String,
    pub timeout_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fetch_window: FetchWindow::default(),
            chart_axis: ChartAxis::default(),
            max_display_bars: DEFAULT_DISPLAY_BARS,
            calendar_country: String::from("United States"),
            timeout_ms: 10_000,
        }
    }
}

impl DashboardConfig {
    /// Defaults overlaid with any `PIVOTDESK_*` variables present in the process environment.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ValidationError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_FETCH_WINDOW) {
            config.fetch_window = value.parse()?;
        }
        if let Some(value) = lookup(ENV_CHART_AXIS) {
            config.chart_axis = value.parse()?;
        }
        if let Some(value) = lookup(ENV_MAX_BARS) {
            config.max_display_bars =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ValidationError::InvalidSetting {
                        name: ENV_MAX_BARS,
                        value: value.clone(),
                    })?;
        }
        if let Some(value) = lookup(ENV_CALENDAR_COUNTRY) {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(ValidationError::InvalidSetting {
                    name: ENV_CALENDAR_COUNTRY,
                    value,
                });
            }
            config.calendar_country = trimmed.to_owned();
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = value
                .trim()
                .parse()
                .map_err(|_| ValidationError::InvalidSetting {
                    name: ENV_TIMEOUT_MS,
                    value: value.clone(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_display_bars == 0 {
            return Err(ValidationError::ZeroDisplayBars);
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidSetting {
                name: "timeout_ms",
                value: String::from("0"),
            });
        }
        Ok(())
    }
}
