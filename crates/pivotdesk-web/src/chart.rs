//! Candlestick chart with the pivot levels overlaid, rendered as an SVG document.
//!
//! Layout follows a 10x5 inch figure at 100 dpi: the plot area sits inside
//! fixed margins, each level is a dashed horizontal line labelled just past
//! the right edge of the plot, and x tick labels are rotated `dd-Mon` dates.

use std::fmt::Write as _;

use pivotdesk_core::domain::dates::format_day_month;
use pivotdesk_core::{ChartAxis, DailyBar, PivotAnalysis, PivotLevel, PivotLevels};

use crate::markup::escape;
use crate::table::format_price;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 60.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 70.0;
const BODY_WIDTH: f64 = 6.0;
const Y_TICKS: usize = 6;

pub const BULLISH_COLOR: &str = "green";
pub const BEARISH_COLOR: &str = "red";
pub const WICK_COLOR: &str = "black";

pub fn level_color(level: PivotLevel) -> &'static str {
    match level {
        PivotLevel::Pivot => "purple",
        PivotLevel::R1 => "green",
        PivotLevel::R2 => "darkgreen",
        PivotLevel::S1 => "red",
        PivotLevel::S2 => "darkred",
    }
}

pub fn chart_title(analysis: &PivotAnalysis) -> String {
    format!("{} \u{2013} Candles & Pivot Points", analysis.symbol)
}

/// Render the display window of `analysis` with its pivot levels.
pub fn render_chart(analysis: &PivotAnalysis, axis: ChartAxis) -> String {
    let bars = analysis.window.bars();
    let frame = Frame::new(bars, &analysis.levels, axis);
    let mut svg = String::with_capacity(8 * 1024);

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="12">"#
    );
    let _ = writeln!(svg, r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text class="title" x="{:.1}" y="24" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        escape(&chart_title(analysis))
    );

    write_grid(&mut svg, &frame, bars);
    for bar in bars {
        write_candle(&mut svg, &frame, bar);
    }
    write_levels(&mut svg, &frame, &analysis.levels);

    let _ = writeln!(
        svg,
        r#"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{:.1}" height="{:.1}" fill="none" stroke="black"/>"#,
        frame.plot_width(),
        frame.plot_height()
    );
    let _ = writeln!(
        svg,
        r#"<text class="y-label" transform="translate(18 {:.1}) rotate(-90)" text-anchor="middle">Price (USD)</text>"#,
        MARGIN_TOP + frame.plot_height() / 2.0
    );
    svg.push_str("</svg>\n");
    svg
}

fn write_grid(svg: &mut String, frame: &Frame, bars: &[DailyBar]) {
    let right = MARGIN_LEFT + frame.plot_width();
    let bottom = MARGIN_TOP + frame.plot_height();

    for step in 0..Y_TICKS {
        let price = frame.low + (frame.high - frame.low) * step as f64 / (Y_TICKS - 1) as f64;
        let y = frame.y(price);
        let _ = writeln!(
            svg,
            r##"<line class="grid" x1="{MARGIN_LEFT}" y1="{y:.2}" x2="{right:.2}" y2="{y:.2}" stroke="#dddddd"/>"##
        );
        let _ = writeln!(
            svg,
            r#"<text class="y-tick" x="{:.1}" y="{y:.2}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            MARGIN_LEFT - 6.0,
            format_price(price)
        );
    }

    for bar in bars {
        let x = frame.x(bar);
        let _ = writeln!(
            svg,
            r##"<line class="grid" x1="{x:.2}" y1="{MARGIN_TOP}" x2="{x:.2}" y2="{bottom:.2}" stroke="#dddddd"/>"##
        );
        let _ = writeln!(
            svg,
            r#"<text class="x-tick" transform="translate({x:.2} {:.2}) rotate(-45)" text-anchor="end">{}</text>"#,
            bottom + 14.0,
            format_day_month(bar.date)
        );
    }
}

fn write_candle(svg: &mut String, frame: &Frame, bar: &DailyBar) {
    let x = frame.x(bar);
    let color = if bar.is_bullish() {
        BULLISH_COLOR
    } else {
        BEARISH_COLOR
    };

    let _ = writeln!(
        svg,
        r#"<line class="wick" x1="{x:.2}" y1="{:.2}" x2="{x:.2}" y2="{:.2}" stroke="{WICK_COLOR}" stroke-width="1"/>"#,
        frame.y(bar.low),
        frame.y(bar.high)
    );

    let top = frame.y(bar.open.max(bar.close));
    let height = (frame.y(bar.open.min(bar.close)) - top).max(1.0);
    let _ = writeln!(
        svg,
        r#"<rect class="body" x="{:.2}" y="{top:.2}" width="{BODY_WIDTH}" height="{height:.2}" fill="{color}"/>"#,
        x - BODY_WIDTH / 2.0
    );
}

fn write_levels(svg: &mut String, frame: &Frame, levels: &PivotLevels) {
    let right = MARGIN_LEFT + frame.plot_width();

    for (level, value) in levels.rows() {
        let y = frame.y(value);
        let color = level_color(level);
        let _ = writeln!(
            svg,
            r#"<line class="level" data-level="{}" x1="{MARGIN_LEFT}" y1="{y:.2}" x2="{right:.2}" y2="{y:.2}" stroke="{color}" stroke-width="1" stroke-dasharray="6 4"/>"#,
            level.label()
        );
        let _ = writeln!(
            svg,
            r#"<text class="level-label" x="{:.2}" y="{y:.2}" fill="{color}" font-size="11" dominant-baseline="middle">{}</text>"#,
            right + 4.0,
            level.label()
        );
    }
}

/// Data-to-pixel mapping for one chart.
struct Frame {
    low: f64,
    high: f64,
    slots: f64,
    first_day: i32,
    axis: ChartAxis,
    index_of: Vec<(time::Date, usize)>,
}

impl Frame {
    fn new(bars: &[DailyBar], levels: &PivotLevels, axis: ChartAxis) -> Self {
        let mut low = levels.value(levels.lowest());
        let mut high = levels.value(levels.highest());
        for bar in bars {
            low = low.min(bar.low);
            high = high.max(bar.high);
        }

        let span = high - low;
        let pad = if span > 0.0 { span * 0.05 } else { 1.0 };

        let first_day = bars.first().map_or(0, |bar| bar.date.to_julian_day());
        let last_day = bars.last().map_or(0, |bar| bar.date.to_julian_day());
        let slots = match axis {
            ChartAxis::Categorical => bars.len().max(1) as f64,
            ChartAxis::Date => f64::from(last_day - first_day + 1).max(1.0),
        };

        Self {
            low: low - pad,
            high: high + pad,
            slots,
            first_day,
            axis,
            index_of: bars.iter().enumerate().map(|(i, bar)| (bar.date, i)).collect(),
        }
    }

    fn plot_width(&self) -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height(&self) -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn x(&self, bar: &DailyBar) -> f64 {
        let slot = match self.axis {
            ChartAxis::Categorical => self
                .index_of
                .iter()
                .find(|(date, _)| *date == bar.date)
                .map_or(0.0, |(_, index)| *index as f64),
            ChartAxis::Date => f64::from(bar.date.to_julian_day() - self.first_day),
        };
        MARGIN_LEFT + (slot + 0.5) * self.plot_width() / self.slots
    }

    fn y(&self, price: f64) -> f64 {
        MARGIN_TOP + (self.high - price) / (self.high - self.low) * self.plot_height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivotdesk_core::{analyze, PriceSeries, Symbol};
    use time::macros::date;

    fn analysis() -> PivotAnalysis {
        let bars = vec![
            // bearish
            DailyBar::checked(date!(2024 - 01 - 04), 101.0, 102.0, 98.0, 99.0, None).expect("valid"),
            // bullish
            DailyBar::checked(date!(2024 - 01 - 05), 100.0, 110.0, 95.0, 105.0, None).expect("valid"),
            // doji counts as bullish
            DailyBar::checked(date!(2024 - 01 - 08), 104.0, 106.0, 103.0, 104.0, None).expect("valid"),
        ];
        let series = PriceSeries::new(Symbol::parse("SPY").expect("valid"), bars).expect("ordered");
        analyze(&series, date!(2024 - 01 - 05), 10).expect("friday exists")
    }

    fn count(svg: &str, needle: &str) -> usize {
        svg.matches(needle).count()
    }

    fn x_positions(svg: &str) -> Vec<f64> {
        svg.lines()
            .filter(|line| line.starts_with(r#"<line class="wick""#))
            .filter_map(|line| {
                let start = line.find("x1=\"")? + 4;
                let end = start + line[start..].find('"')?;
                line[start..end].parse().ok()
            })
            .collect()
    }

    #[test]
    fn draws_one_candle_per_bar_with_direction_colors() {
        let svg = render_chart(&analysis(), ChartAxis::Categorical);

        assert_eq!(count(&svg, r#"class="wick""#), 3);
        assert_eq!(count(&svg, r#"class="body""#), 3);
        assert_eq!(count(&svg, r#"stroke="black" stroke-width="1"/>"#), 3);
        assert_eq!(count(&svg, r#"class="body" "#), count(&svg, "fill=\"green\"/>") + count(&svg, "fill=\"red\"/>"));
        assert_eq!(count(&svg, "fill=\"green\"/>"), 2);
        assert_eq!(count(&svg, "fill=\"red\"/>"), 1);
    }

    #[test]
    fn draws_five_dashed_labelled_levels() {
        let svg = render_chart(&analysis(), ChartAxis::Categorical);

        assert_eq!(count(&svg, r#"class="level""#), 5);
        assert_eq!(count(&svg, r#"stroke-dasharray="6 4""#), 5);
        for level in PivotLevel::ALL {
            let label = format!(r#"fill="{}" font-size="11" dominant-baseline="middle">{}</text>"#, level_color(level), level.label());
            assert_eq!(count(&svg, &label), 1, "missing label for {level}");
        }
    }

    #[test]
    fn carries_title_axis_label_and_day_month_ticks() {
        let svg = render_chart(&analysis(), ChartAxis::Categorical);

        assert!(svg.contains("SPY \u{2013} Candles &amp; Pivot Points"));
        assert!(svg.contains(">Price (USD)</text>"));
        assert!(svg.contains(">04-Jan</text>"));
        assert!(svg.contains(">08-Jan</text>"));
        assert!(count(&svg, r#"class="grid""#) >= Y_TICKS);
    }

    #[test]
    fn categorical_axis_spaces_bars_evenly() {
        let svg = render_chart(&analysis(), ChartAxis::Categorical);
        let xs = x_positions(&svg);

        assert_eq!(xs.len(), 3);
        assert!(((xs[1] - xs[0]) - (xs[2] - xs[1])).abs() < 0.05);
    }

    #[test]
    fn date_axis_leaves_weekend_gaps() {
        let svg = render_chart(&analysis(), ChartAxis::Date);
        let xs = x_positions(&svg);

        // Thu -> Fri is one day, Fri -> Mon is three
        assert!(((xs[2] - xs[1]) - 3.0 * (xs[1] - xs[0])).abs() < 0.05);
    }

    #[test]
    fn empty_window_still_renders_levels() {
        let mut empty = analysis();
        empty.window = PriceSeries::empty(empty.symbol.clone());

        let svg = render_chart(&empty, ChartAxis::Date);
        assert_eq!(count(&svg, r#"class="wick""#), 0);
        assert_eq!(count(&svg, r#"class="level""#), 5);
        assert!(svg.ends_with("</svg>\n"));
    }
}
