//! Floor-trader pivot points and the OHLC window selection around them.
//!
//! Every function here is pure: inputs are borrowed, results are freshly
//! allocated, and nothing is cached between calls.
//!
//! ```rust
//! use pivotdesk_core::{compute_pivot_levels, DailyBar};
//! use time::macros::date;
//!
//! let bar = DailyBar::checked(date!(2024 - 01 - 05), 100.0, 110.0, 95.0, 105.0, None)?;
//! let levels = compute_pivot_levels(&bar)?;
//! assert!((levels.pivot - 103.333).abs() < 1e-3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::dates::is_weekday;
use crate::{DailyBar, PivotError, PriceSeries, Symbol};

/// Fewer bars than this and the provider response is treated as unusable.
pub const MIN_HISTORY_BARS: usize = 2;

/// Bars shown on the chart unless configured otherwise.
pub const DEFAULT_DISPLAY_BARS: usize = 10;

/// Pivot and its first two support/resistance bands for one session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub resistance1: f64,
    pub resistance2: f64,
    pub support1: f64,
    pub support2: f64,
}

/// Names of the five levels, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PivotLevel {
    Pivot,
    R1,
    R2,
    S1,
    S2,
}

impl PivotLevel {
    pub const ALL: [Self; 5] = [Self::Pivot, Self::R1, Self::R2, Self::S1, Self::S2];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pivot => "Pivot",
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::S1 => "S1",
            Self::S2 => "S2",
        }
    }
}

impl Display for PivotLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl PivotLevels {
    pub const fn value(&self, level: PivotLevel) -> f64 {
        match level {
            PivotLevel::Pivot => self.pivot,
            PivotLevel::R1 => self.resistance1,
            PivotLevel::R2 => self.resistance2,
            PivotLevel::S1 => self.support1,
            PivotLevel::S2 => self.support2,
        }
    }

    /// `(level, value)` in table order: Pivot, R1, R2, S1, S2.
    pub fn rows(&self) -> [(PivotLevel, f64); 5] {
        PivotLevel::ALL.map(|level| (level, self.value(level)))
    }

    /// `resistance1 - support1`, the bar's `high - low` up to rounding. The
    /// second band sits this far from the pivot.
    pub fn band_width(&self) -> f64 {
        self.resistance1 - self.support1
    }

    pub fn highest(&self) -> PivotLevel {
        self.extreme(|candidate, best| candidate > best)
    }

    pub fn lowest(&self) -> PivotLevel {
        self.extreme(|candidate, best| candidate < best)
    }

    pub fn is_monotonic(&self) -> bool {
        self.support2 <= self.support1
            && self.support1 <= self.pivot
            && self.pivot <= self.resistance1
            && self.resistance1 <= self.resistance2
    }

    fn extreme(&self, better: impl Fn(f64, f64) -> bool) -> PivotLevel {
        let mut best = PivotLevel::Pivot;
        for (level, value) in self.rows() {
            if better(value, self.value(best)) {
                best = level;
            }
        }
        best
    }
}

/// Classic floor-trader pivot for one session.
///
/// Fails with [`PivotError::DataIntegrity`] when the bar breaks
/// `low <= open, close <= high`; a malformed bar would otherwise yield a
/// non-monotonic level set.
///
/// `R1 = 2P - L` and `S1 = 2P - H` are evaluated as `P + (P - L)` and
/// `P - (H - P)`, and the pivot is clamped into `[low, high]`. Every offset
/// is then non-negative, so float rounding keeps the levels ordered even
/// for flat bars such as `0.1/0.1/0.1/0.1`.
pub fn compute_pivot_levels(bar: &DailyBar) -> Result<PivotLevels, PivotError> {
    bar.validate()?;

    let pivot = ((bar.high + bar.low + bar.close) / 3.0).clamp(bar.low, bar.high);
    let band = bar.high - bar.low;

    Ok(PivotLevels {
        pivot,
        resistance1: pivot + (pivot - bar.low),
        resistance2: pivot + band,
        support1: pivot - (bar.high - pivot),
        support2: pivot - band,
    })
}

/// The bar dated exactly `target`; no nearest-day fallback.
pub fn select_bar(series: &PriceSeries, target: Date) -> Result<&DailyBar, PivotError> {
    if series.len() < MIN_HISTORY_BARS {
        return Err(PivotError::InsufficientHistory {
            available: series.len(),
            required: MIN_HISTORY_BARS,
        });
    }

    series
        .bars()
        .iter()
        .find(|bar| bar.date == target)
        .ok_or(PivotError::NoBarForDate { date: target })
}

/// Trailing `max_bars` weekday bars, ascending. Weekend-dated records are
/// dropped; market holidays are not detected.
pub fn select_display_window(series: &PriceSeries, max_bars: usize) -> PriceSeries {
    let weekdays: Vec<DailyBar> = series
        .bars()
        .iter()
        .filter(|bar| is_weekday(bar.date))
        .cloned()
        .collect();
    let skip = weekdays.len().saturating_sub(max_bars);
    let window = weekdays.into_iter().skip(skip).collect();

    // a filtered suffix of an ordered, unique series stays ordered and unique
    PriceSeries::from_unordered(series.symbol.clone(), window)
}

/// Everything the presentation layer needs for one analysed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotAnalysis {
    pub symbol: Symbol,
    pub date: Date,
    pub bar: DailyBar,
    pub levels: PivotLevels,
    pub window: PriceSeries,
}

/// Select the session for `target`, compute its levels and cut the display window.
pub fn analyze(
    series: &PriceSeries,
    target: Date,
    max_bars: usize,
) -> Result<PivotAnalysis, PivotError> {
    let bar = select_bar(series, target)?;
    let levels = compute_pivot_levels(bar)?;

    Ok(PivotAnalysis {
        symbol: series.symbol.clone(),
        date: target,
        bar: bar.clone(),
        levels,
        window: select_display_window(series, max_bars),
    })
}
