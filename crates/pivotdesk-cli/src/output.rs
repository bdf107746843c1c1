use std::io::{self, Write};

use pivotdesk_core::domain::dates::{format_day_month_year, format_iso};
use pivotdesk_core::{EconomicEvent, PivotAnalysis};
use pivotdesk_web::{ohlc_rows, pivot_rows, Highlight, TableRow};

use crate::cli::OutputFormat;
use crate::commands::Report;
use crate::error::CliError;

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(&mut out, report, format, pretty)
}

fn render_to(
    out: &mut impl Write,
    report: &Report,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&report.envelope)?
            } else {
                serde_json::to_string(&report.envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => {
            out.write_all(report.table.as_bytes())?;
            for warning in &report.envelope.meta.warnings {
                writeln!(out, "warning: {warning}")?;
            }
            for error in &report.envelope.errors {
                writeln!(out, "error: {}: {}", error.code, error.message)?;
            }
            let sources: Vec<&str> = report
                .envelope
                .meta
                .source_chain
                .iter()
                .map(|source| source.as_str())
                .collect();
            writeln!(
                out,
                "source: {}  latency_ms: {}  request_id: {}",
                sources.join(","),
                report.envelope.meta.latency_ms,
                report.envelope.meta.request_id
            )?;
        }
    }

    Ok(())
}

/// Heading plus the OHLC and pivot tables.
pub fn analysis_table(analysis: &PivotAnalysis) -> String {
    let mut text = format!(
        "{} on {}\n\nOHLC Values\n",
        analysis.symbol,
        format_day_month_year(analysis.date)
    );
    text.push_str(&value_table(&ohlc_rows(&analysis.bar)));
    text.push_str("\nPivot Point Levels\n");
    text.push_str(&value_table(&pivot_rows(&analysis.levels)));
    text
}

fn value_table(rows: &[TableRow]) -> String {
    let values: Vec<String> = rows.iter().map(TableRow::formatted).collect();
    let width = values.iter().map(String::len).max().unwrap_or(0).max(5);

    let mut text = format!("{:<10} {:>width$}\n", "Indicator", "Value");
    for (row, value) in rows.iter().zip(&values) {
        let marker = match row.highlight {
            Some(Highlight::Max) => "  (max)",
            Some(Highlight::Min) => "  (min)",
            None => "",
        };
        text.push_str(&format!("{:<10} {value:>width$}{marker}\n", row.label));
    }
    text
}

/// Events as aligned columns; missing values print as `-`.
pub fn events_table(events: &[EconomicEvent]) -> String {
    const HEADERS: [&str; 7] = [
        "Date",
        "Time",
        "Event",
        "Importance",
        "Actual",
        "Forecast",
        "Previous",
    ];

    if events.is_empty() {
        return String::from("No events.\n");
    }

    let rows: Vec<[String; 7]> = events
        .iter()
        .map(|event| {
            [
                format_iso(event.date),
                cell(&event.time),
                event.event.clone(),
                event.importance.to_string(),
                cell(&event.actual),
                cell(&event.forecast),
                cell(&event.previous),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let mut text = String::new();
    push_line(&mut text, HEADERS.iter().copied(), &widths);
    for row in &rows {
        push_line(&mut text, row.iter().map(String::as_str), &widths);
    }
    text
}

fn push_line<'a>(text: &mut String, values: impl Iterator<Item = &'a str>, widths: &[usize; 7]) {
    let line: Vec<String> = values
        .zip(widths)
        .map(|(value, width)| format!("{value:<width$}"))
        .collect();
    text.push_str(line.join("  ").trim_end());
    text.push('\n');
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| String::from("-"))
}
