//! # pivotdesk-web
//!
//! Presentation of a [`DashboardPage`](pivotdesk_core::DashboardPage): value
//! tables, an SVG candlestick chart, the HTML page and the axum server that
//! serves them.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /` | Dashboard page (`ticker`, `date`, `analyze`, `econ_date`, `importance`) |
//! | `GET /chart.svg` | Candlestick chart (`ticker`, `date`) |
//! | `GET /api/pivots` | Envelope with the pivot analysis |
//! | `GET /api/calendar` | Envelope with economic events (`date`, `importance`) |
//! | `GET /health` | Liveness |

pub mod chart;
pub mod error;
mod markup;
pub mod page;
pub mod routes;
pub mod server;
pub mod table;

pub use chart::render_chart;
pub use error::WebError;
pub use page::render_page;
pub use routes::{router, AppState};
pub use server::serve;
pub use table::{format_price, ohlc_rows, pivot_rows, Highlight, TableRow};
