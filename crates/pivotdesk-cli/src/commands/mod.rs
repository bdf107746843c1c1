mod analyze;
mod calendar;
mod serve;

use pivotdesk_core::{Dashboard, Envelope, EnvelopeError, EnvelopeMeta, ProviderId};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    /// Human-readable rendering used by `--format table`.
    pub table: String,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            table: String::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
        }
    }

    pub fn with_table(mut self, table: String) -> Self {
        self.table = table;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    fn into_report(self) -> Result<Report, CliError> {
        let mut meta = EnvelopeMeta::new(self.source_chain, self.latency_ms)?;
        for warning in self.warnings {
            meta.push_warning(warning);
        }

        Ok(Report {
            envelope: Envelope::with_errors(meta, self.data, self.errors)?,
            table: self.table,
        })
    }
}

/// A finished command, ready for rendering.
pub struct Report {
    pub envelope: Envelope<Value>,
    pub table: String,
}

/// Run the selected command. `serve` only returns once the server stops and
/// produces no report.
pub async fn run(cli: &Cli) -> Result<Option<Report>, CliError> {
    let config = cli.dashboard_config()?;
    let dashboard = if cli.mock {
        Dashboard::offline(config)
    } else {
        Dashboard::live(config)
    };

    let result = match &cli.command {
        Command::Analyze(args) => analyze::run(args, &dashboard).await?,
        Command::Calendar(args) => calendar::run(args, &dashboard).await?,
        Command::Serve(args) => {
            serve::run(args, dashboard).await?;
            return Ok(None);
        }
    };

    result.into_report().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_carries_warnings_and_errors() {
        let error = EnvelopeError::new("pivot.no_market_data", "no market data for 2024-01-06")
            .expect("valid error");
        let report = CommandResult::ok(Value::Null, vec![ProviderId::Yahoo])
            .with_warning("offline data")
            .with_errors(vec![error])
            .with_latency(7)
            .into_report()
            .expect("valid report");

        assert_eq!(report.envelope.meta.warnings, vec![String::from("offline data")]);
        assert_eq!(report.envelope.meta.latency_ms, 7);
        assert_eq!(report.envelope.errors.len(), 1);
    }
}
