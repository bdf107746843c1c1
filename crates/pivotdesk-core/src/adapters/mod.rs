mod calendar;
mod yahoo;

pub use calendar::{country_code, EconomicCalendarAdapter};
pub use yahoo::YahooAdapter;
