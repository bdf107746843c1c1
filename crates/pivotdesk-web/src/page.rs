use std::fmt::Write as _;

use pivotdesk_core::domain::dates::{format_day_month_year, format_iso};
use pivotdesk_core::{
    ChartAxis, DashboardPage, EconomicEvent, Importance, Notice, PivotAnalysis,
};

use crate::chart::render_chart;
use crate::markup::escape;
use crate::table::{ohlc_rows, pivot_rows, TableRow};

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 1040px; margin: 0 auto; padding: 24px; color: #222; }
h1 { border-bottom: 2px solid #444; padding-bottom: 8px; }
form { display: flex; gap: 12px; align-items: end; flex-wrap: wrap; margin: 12px 0; }
label { display: flex; flex-direction: column; font-size: 0.9em; }
table { border-collapse: collapse; margin: 8px 0 16px; min-width: 280px; }
th, td { border: 1px solid #ccc; padding: 4px 10px; text-align: left; }
td.value { text-align: right; font-variant-numeric: tabular-nums; }
tr.highlight-max td { background: lightgreen; }
tr.highlight-min td { background: lightcoral; }
.notice { padding: 8px 12px; border-radius: 4px; margin: 8px 0; }
.notice.error { background: #fde2e2; color: #8a1c1c; }
.notice.warning { background: #fff4d6; color: #7a5a00; }
.notice.info { background: #e2efff; color: #1c4a8a; }
"#;

/// The whole dashboard as one HTML document; the chart is inlined as SVG.
pub fn render_page(page: &DashboardPage, axis: ChartAxis) -> String {
    let request = &page.request;
    let mut html = String::with_capacity(32 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Pivot Point Analysis</title>\n");
    let _ = writeln!(html, "<style>{STYLE}</style>\n</head>\n<body>");
    html.push_str("<h1>Pivot Point Analysis with Candlestick Chart</h1>\n");

    // analysis form; calendar state rides along so it survives a re-submit
    html.push_str("<form method=\"get\" action=\"/\" class=\"analysis-form\">\n");
    let _ = writeln!(
        html,
        r#"<label>Ticker (e.g. SPY, AAPL, PETR4.SA)<input type="text" name="ticker" value="{}"></label>"#,
        escape(&request.ticker)
    );
    let _ = writeln!(
        html,
        r#"<label>Analysis date<input type="date" name="date" value="{}"></label>"#,
        format_iso(request.date)
    );
    html.push_str(r#"<input type="hidden" name="analyze" value="true">"#);
    html.push('\n');
    write_hidden_calendar_state(&mut html, page);
    html.push_str("<button type=\"submit\">Analyze</button>\n</form>\n");

    write_notices(&mut html, &page.analysis_notices);
    if let Some(analysis) = &page.analysis {
        write_analysis(&mut html, analysis, axis);
    }

    html.push_str("<section class=\"calendar\">\n<h2>Economic Calendar</h2>\n");
    html.push_str("<form method=\"get\" action=\"/\" class=\"calendar-form\">\n");
    let _ = writeln!(
        html,
        r#"<label>Calendar date<input type="date" name="econ_date" value="{}"></label>"#,
        format_iso(request.econ_date)
    );
    html.push_str("<label>Importance<select name=\"importance\">");
    for importance in Importance::ALL {
        let selected = if importance == request.importance {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            html,
            r#"<option value="{0}"{selected}>{0}</option>"#,
            importance.as_str()
        );
    }
    html.push_str("</select></label>\n");
    let _ = writeln!(
        html,
        r#"<input type="hidden" name="ticker" value="{}"><input type="hidden" name="date" value="{}"><input type="hidden" name="analyze" value="{}">"#,
        escape(&request.ticker),
        format_iso(request.date),
        request.analyze
    );
    html.push_str("<button type=\"submit\">Show events</button>\n</form>\n");

    write_notices(&mut html, &page.calendar_notices);
    if !page.events.is_empty() {
        write_events(&mut html, &page.events);
    }
    html.push_str("</section>\n</body>\n</html>\n");
    html
}

fn write_hidden_calendar_state(html: &mut String, page: &DashboardPage) {
    let _ = writeln!(
        html,
        r#"<input type="hidden" name="econ_date" value="{}"><input type="hidden" name="importance" value="{}">"#,
        format_iso(page.request.econ_date),
        page.request.importance
    );
}

fn write_notices(html: &mut String, notices: &[Notice]) {
    for notice in notices {
        let _ = writeln!(
            html,
            r#"<div class="notice {}" role="status">{}</div>"#,
            notice.level.as_str(),
            escape(&notice.message)
        );
    }
}

fn write_analysis(html: &mut String, analysis: &PivotAnalysis, axis: ChartAxis) {
    html.push_str("<section class=\"analysis\">\n");
    let _ = writeln!(
        html,
        "<h2>{} on {}</h2>",
        escape(analysis.symbol.as_str()),
        format_day_month_year(analysis.date)
    );

    html.push_str("<h3>OHLC Values</h3>\n");
    write_value_table(html, "ohlc", &ohlc_rows(&analysis.bar));
    html.push_str("<h3>Pivot Point Levels</h3>\n");
    write_value_table(html, "pivots", &pivot_rows(&analysis.levels));

    html.push_str("<figure class=\"chart\">\n");
    html.push_str(&render_chart(analysis, axis));
    html.push_str("</figure>\n</section>\n");
}

fn write_value_table(html: &mut String, id: &str, rows: &[TableRow]) {
    let _ = writeln!(
        html,
        r#"<table id="{id}"><thead><tr><th>Indicator</th><th>Value</th></tr></thead><tbody>"#
    );
    for row in rows {
        let class = row
            .highlight
            .map(|highlight| format!(r#" class="{}""#, highlight.css_class()))
            .unwrap_or_default();
        let _ = writeln!(
            html,
            r#"<tr{class}><td>{}</td><td class="value">{}</td></tr>"#,
            row.label,
            row.formatted()
        );
    }
    html.push_str("</tbody></table>\n");
}

fn write_events(html: &mut String, events: &[EconomicEvent]) {
    html.push_str(
        "<table id=\"events\"><thead><tr><th>Date</th><th>Time</th><th>Event</th>\
         <th>Importance</th><th>Actual</th><th>Forecast</th><th>Previous</th></tr></thead><tbody>\n",
    );
    for event in events {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            format_iso(event.date),
            optional(&event.time),
            escape(&event.event),
            event.importance,
            optional(&event.actual),
            optional(&event.forecast),
            optional(&event.previous)
        );
    }
    html.push_str("</tbody></table>\n");
}

fn optional(value: &Option<String>) -> String {
    value.as_deref().map(escape).unwrap_or_default()
}
