//! Journey assembly on top of the street and transit searches

pub mod assembler;
pub mod route;
pub mod to_geojson;

use chrono::{NaiveDateTime, Timelike};

use crate::Time;

/// Converts a wall-clock departure into service-day seconds.
pub fn departure_seconds(at: NaiveDateTime) -> Time {
    at.time().num_seconds_from_midnight()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn departure_seconds_counts_from_midnight() {
        let at = NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(departure_seconds(at), 8 * 3600 + 30 * 60);
    }
}
