use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Symbol, ValidationError};

/// One trading session's price summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl DailyBar {
    /// Build a bar from provider values.
    ///
    /// Prices must be finite and non-negative. The OHLC ordering is *not*
    /// enforced here so that malformed upstream data reaches the calculator,
    /// which rejects it through [`DailyBar::validate`].
    pub fn new(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        let bar = Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        };
        bar.validate_prices()?;
        Ok(bar)
    }

    /// Build a bar and enforce the full OHLC invariant.
    pub fn checked(
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        let bar = Self::new(date, open, high, low, close, volume)?;
        bar.validate()?;
        Ok(bar)
    }

    /// Check `low <= open, close <= high` on top of the price checks.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_prices()?;

        if self.high < self.low {
            return Err(ValidationError::InvalidBarRange { date: self.date });
        }

        if self.open < self.low
            || self.open > self.high
            || self.close < self.low
            || self.close > self.high
        {
            return Err(ValidationError::InvalidBarBounds { date: self.date });
        }

        Ok(())
    }

    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    fn validate_prices(&self) -> Result<(), ValidationError> {
        validate_non_negative("open", self.open)?;
        validate_non_negative("high", self.high)?;
        validate_non_negative("low", self.low)?;
        validate_non_negative("close", self.close)
    }
}

/// Daily bars for one symbol, ascending by date with no repeated trading day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    bars: Vec<DailyBar>,
}

impl PriceSeries {
    pub fn new(symbol: Symbol, bars: Vec<DailyBar>) -> Result<Self, ValidationError> {
        for pair in bars.windows(2) {
            let (previous, next) = (pair[0].date, pair[1].date);
            if previous == next {
                return Err(ValidationError::DuplicateDate { date: next });
            }
            if previous > next {
                return Err(ValidationError::UnsortedSeries { previous, next });
            }
        }

        Ok(Self { symbol, bars })
    }

    /// Sort provider output by date and keep the last record seen for each day.
    pub fn from_unordered(symbol: Symbol, mut bars: Vec<DailyBar>) -> Self {
        // stable sort keeps provider order within a day, so `last` wins below
        bars.sort_by_key(|bar| bar.date);
        let mut deduped: Vec<DailyBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            symbol,
            bars: deduped,
        }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<Date> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<Date> {
        self.bars.last().map(|bar| bar.date)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
