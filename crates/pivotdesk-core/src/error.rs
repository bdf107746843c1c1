use thiserror::Error;
use time::Date;

use crate::SourceError;

/// Validation and contract errors exposed by `pivotdesk-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter, digit or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("invalid importance '{value}', expected one of high, medium, low")]
    InvalidImportance { value: String },
    #[error("invalid fetch window '{value}', expected one of 5d, 7d")]
    InvalidFetchWindow { value: String },
    #[error("invalid chart axis '{value}', expected one of categorical, date")]
    InvalidChartAxis { value: String },
    #[error("invalid value '{value}' for {name}")]
    InvalidSetting { name: &'static str, value: String },
    #[error("max display bars must be greater than zero")]
    ZeroDisplayBars,

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar dated {date}: high must be >= low")]
    InvalidBarRange { date: Date },
    #[error("bar dated {date}: open/close must be within high/low range")]
    InvalidBarBounds { date: Date },

    #[error("price series must be in ascending date order ({previous} is followed by {next})")]
    UnsortedSeries { previous: Date, next: Date },
    #[error("price series contains more than one bar for {date}")]
    DuplicateDate { date: Date },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("source_chain must name at least one provider")]
    EmptySourceChain,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Failures of the pivot calculator.
///
/// `InsufficientHistory` and `NoBarForDate` are the two flavours of
/// "no market data"; `DataIntegrity` means the upstream bar is malformed and
/// must not be computed through.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PivotError {
    #[error("insufficient market data: {available} bar(s) available, at least {required} required")]
    InsufficientHistory { available: usize, required: usize },

    #[error("no market data for {date}; check that it is a business day")]
    NoBarForDate { date: Date },

    #[error("data integrity violation: {0}")]
    DataIntegrity(#[from] ValidationError),
}

impl PivotError {
    pub const fn is_no_market_data(&self) -> bool {
        matches!(
            self,
            Self::InsufficientHistory { .. } | Self::NoBarForDate { .. }
        )
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::InsufficientHistory { .. } => "pivot.insufficient_history",
            Self::NoBarForDate { .. } => "pivot.no_market_data",
            Self::DataIntegrity(_) => "pivot.data_integrity",
        }
    }
}

/// Failures of one dashboard operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Pivot(#[from] PivotError),
}

impl DeskError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation.invalid_input",
            Self::Source(error) => error.code(),
            Self::Pivot(error) => error.code(),
        }
    }
}
