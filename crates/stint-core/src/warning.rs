//! Early-warning resolution

use chrono::{DateTime, Local};
use stint_api::LeadMinutes;
use stint_util::add_minutes;

/// Instant `lead` minutes before `boundary`.
///
/// `None` only when the subtraction leaves chrono's representable range.
pub fn early_warning(boundary: DateTime<Local>, lead: LeadMinutes) -> Option<DateTime<Local>> {
    add_minutes(boundary, -(lead.get() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_five_minutes_before_noon() {
        let boundary = Local.with_ymd_and_hms(2025, 12, 25, 12, 0, 0).unwrap();
        let warning = early_warning(boundary, LeadMinutes::new(5).unwrap()).unwrap();
        assert_eq!(warning, Local.with_ymd_and_hms(2025, 12, 25, 11, 55, 0).unwrap());
    }

    #[test]
    fn test_crosses_midnight() {
        let boundary = Local.with_ymd_and_hms(2025, 12, 26, 0, 3, 0).unwrap();
        let warning = early_warning(boundary, LeadMinutes::new(10).unwrap()).unwrap();
        assert_eq!(warning, Local.with_ymd_and_hms(2025, 12, 25, 23, 53, 0).unwrap());
    }
}
