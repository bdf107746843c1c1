use pivotdesk_core::Dashboard;

use crate::cli::ServeArgs;
use crate::error::CliError;

/// Blocks until the server stops; the listen address is logged at `info`.
pub async fn run(args: &ServeArgs, dashboard: Dashboard) -> Result<(), CliError> {
    pivotdesk_web::serve(args.addr, dashboard).await?;
    Ok(())
}
