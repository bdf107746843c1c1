use pivotdesk_core::domain::dates::parse_date;
use pivotdesk_core::Dashboard;

use crate::cli::CalendarArgs;
use crate::error::CliError;
use crate::output::events_table;

use super::CommandResult;

pub async fn run(args: &CalendarArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let date = match &args.date {
        Some(raw) => parse_date(raw)?,
        None => dashboard.today(),
    };

    let timed = dashboard.calendar_timed(date, args.importance).await?;
    let mut result = CommandResult::ok(serde_json::to_value(&timed.value)?, vec![timed.source])
        .with_latency(timed.latency_ms)
        .with_table(events_table(&timed.value));

    if timed.value.is_empty() {
        result = result.with_warning(format!(
            "no {} importance events for {} on {date} or the day after",
            args.importance,
            dashboard.config().calendar_country
        ));
    }

    Ok(result)
}
