//! Calendar-date helpers shared by the calculator, adapters and presentation.

use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, Weekday};

use crate::ValidationError;

/// Parse a `YYYY-MM-DD` date, as produced by HTML date pickers and CLI flags.
pub fn parse_date(input: &str) -> Result<Date, ValidationError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| {
        ValidationError::InvalidDate {
            value: input.to_owned(),
        }
    })
}

/// `2024-01-05`
pub fn format_iso(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// `05-Jan`, used for chart tick labels.
pub fn format_day_month(date: Date) -> String {
    date.format(format_description!("[day]-[month repr:short]"))
        .unwrap_or_else(|_| date.to_string())
}

/// `05-Jan-2024`, used for analysis headings.
pub fn format_day_month_year(date: Date) -> String {
    date.format(format_description!("[day]-[month repr:short]-[year]"))
        .unwrap_or_else(|_| date.to_string())
}

/// `05/01/2024`, used in user-facing notices.
pub fn format_dmy(date: Date) -> String {
    date.format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Coarse trading-calendar check: Saturday and Sunday are not business days.
/// Market holidays are not taken into account.
pub fn is_weekday(date: Date) -> bool {
    !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn yesterday_utc() -> Date {
    today_utc() - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_picker_dates() {
        assert_eq!(parse_date("2024-01-05").expect("valid"), date!(2024 - 01 - 05));
        assert_eq!(parse_date(" 2024-01-05 ").expect("valid"), date!(2024 - 01 - 05));
    }

    #[test]
    fn rejects_other_layouts() {
        assert!(matches!(
            parse_date("05/01/2024"),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn formats_labels() {
        let day = date!(2024 - 01 - 05);
        assert_eq!(format_iso(day), "2024-01-05");
        assert_eq!(format_day_month(day), "05-Jan");
        assert_eq!(format_day_month_year(day), "05-Jan-2024");
        assert_eq!(format_dmy(day), "05/01/2024");
    }

    #[test]
    fn weekends_are_not_weekdays() {
        assert!(is_weekday(date!(2024 - 01 - 05)));
        assert!(!is_weekday(date!(2024 - 01 - 06)));
        assert!(!is_weekday(date!(2024 - 01 - 07)));
        assert!(is_weekday(date!(2024 - 01 - 08)));
    }
}
