use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use pivotdesk_core::Dashboard;

use crate::error::WebError;
use crate::routes::{router, AppState};

/// Bind `addr` and serve the dashboard until the process is stopped.
pub async fn serve(addr: SocketAddr, dashboard: Dashboard) -> Result<(), WebError> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    info!(
        %local_addr,
        price_source = %dashboard.price_source(),
        calendar_source = %dashboard.calendar_source(),
        "pivotdesk dashboard listening"
    );

    axum::serve(listener, router(AppState::new(dashboard))).await?;
    Ok(())
}
