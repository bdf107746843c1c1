use thiserror::Error;

use pivotdesk_core::{SourceError, ValidationError};
use pivotdesk_web::WebError;

/// CLI-level error categories mapped to exit codes.
///
/// Missing market data is not an error here: it is reported inside the
/// envelope and exits with code 3.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Web(#[from] WebError),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Serialization(_) => 4,
            Self::Source(_) => 6,
            Self::Io(_) => 10,
            Self::Web(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_category() {
        assert_eq!(CliError::from(ValidationError::EmptySymbol).exit_code(), 2);
        assert_eq!(CliError::from(SourceError::unavailable("down")).exit_code(), 6);
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert_eq!(CliError::from(io).exit_code(), 10);
    }
}
