use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use pivotdesk_core::{
    DeskError, EnvelopeError, PivotError, SourceError, SourceErrorKind, ValidationError,
};

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Desk(#[from] DeskError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Desk(DeskError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Desk(DeskError::Source(error)) | Self::Source(error)
                if error.kind() == SourceErrorKind::InvalidRequest =>
            {
                StatusCode::BAD_REQUEST
            }
            Self::Desk(DeskError::Pivot(error)) if error.is_no_market_data() => {
                StatusCode::NOT_FOUND
            }
            Self::Desk(DeskError::Pivot(PivotError::DataIntegrity(_)))
            | Self::Desk(DeskError::Source(_))
            | Self::Source(_) => StatusCode::BAD_GATEWAY,
            Self::Desk(DeskError::Pivot(_)) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation.invalid_input",
            Self::Desk(error) => error.code(),
            Self::Source(error) => error.code(),
            Self::Io(_) => "io.failure",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Desk(DeskError::Source(error)) | Self::Source(error) => error.retryable(),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: Vec<EnvelopeError>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            errors: vec![EnvelopeError {
                code: self.code().to_owned(),
                message: self.to_string(),
                retryable: Some(self.retryable()),
                source: None,
            }],
        };
        (self.status(), Json(body)).into_response()
    }
}
