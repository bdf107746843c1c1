//! OHLC and pivot-level tables, shared by the HTML page and the CLI.

use serde::Serialize;

use pivotdesk_core::{DailyBar, PivotLevels};

/// Row emphasis in the pivot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    /// Largest value in the column, shown green.
    Max,
    /// Smallest value in the column, shown red.
    Min,
}

impl Highlight {
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Max => "highlight-max",
            Self::Min => "highlight-min",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: &'static str,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
}

impl TableRow {
    /// The value with two decimals.
    pub fn formatted(&self) -> String {
        format_price(self.value)
    }
}

pub fn format_price(value: f64) -> String {
    format!("{value:.2}")
}

/// Open, High, Low, Close.
pub fn ohlc_rows(bar: &DailyBar) -> Vec<TableRow> {
    [
        ("Open", bar.open),
        ("High", bar.high),
        ("Low", bar.low),
        ("Close", bar.close),
    ]
    .into_iter()
    .map(|(label, value)| TableRow {
        label,
        value,
        highlight: None,
    })
    .collect()
}

/// Pivot, R1, R2, S1, S2 with the maximum and minimum rows marked.
///
/// Every row tied for an extreme is marked. A row that is both the maximum
/// and the minimum (a flat session) shows as the minimum.
pub fn pivot_rows(levels: &PivotLevels) -> Vec<TableRow> {
    let highest = levels.value(levels.highest());
    let lowest = levels.value(levels.lowest());

    levels
        .rows()
        .into_iter()
        .map(|(level, value)| {
            let highlight = if value == lowest {
                Some(Highlight::Min)
            } else if value == highest {
                Some(Highlight::Max)
            } else {
                None
            };
            TableRow {
                label: level.label(),
                value,
                highlight,
            }
        })
        .collect()
}
