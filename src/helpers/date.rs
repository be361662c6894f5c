//! Date helper functions

use chrono::NaiveDate;

/// Render an authored date string for display ("January 5, 2024").
///
/// Dates are stored exactly as authored; anything without an ISO
/// `YYYY-MM-DD` prefix is shown verbatim.
pub fn display_date(date: &str) -> String {
    let iso = date.get(..10).unwrap_or(date);
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(d) => d.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}
