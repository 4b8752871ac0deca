// src/scheduling/service_hours.rs

use chrono::{Duration, NaiveTime, Timelike};

/// A daily opening period. An appointment may start at `opens` or later, as
/// long as it ends no later than `closes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceWindow {
    pub opens: NaiveTime,
    pub closes: NaiveTime,
}

impl ServiceWindow {
    pub fn new(opens: (u32, u32), closes: (u32, u32)) -> Option<Self> {
        Some(Self {
            opens: NaiveTime::from_hms_opt(opens.0, opens.1, 0)?,
            closes: NaiveTime::from_hms_opt(closes.0, closes.1, 0)?,
        })
    }

    /// Only hour and minute of `start` count; seconds are ignored.
    pub fn accepts(&self, start: NaiveTime, length: Duration) -> bool {
        let start_min = i64::from(start.hour() * 60 + start.minute());
        let opens_min = minute_of_day(self.opens);
        let closes_min = minute_of_day(self.closes);
        start_min >= opens_min && start_min + length.num_minutes() <= closes_min
    }
}

fn minute_of_day(t: NaiveTime) -> i64 {
    i64::from(t.num_seconds_from_midnight() / 60)
}

/// The clinic's opening hours: a morning and an afternoon period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceHours {
    pub windows: Vec<ServiceWindow>,
}

impl Default for ServiceHours {
    /// 08:00-12:00 and 14:30-17:00.
    fn default() -> Self {
        let windows = [((8, 0), (12, 0)), ((14, 30), (17, 0))]
            .into_iter()
            .filter_map(|(opens, closes)| ServiceWindow::new(opens, closes))
            .collect();
        Self { windows }
    }
}

impl ServiceHours {
    pub fn accepts(&self, start: NaiveTime, length: Duration) -> bool {
        self.windows.iter().any(|w| w.accepts(start, length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn ok(h: u32, m: u32) -> bool {
        ServiceHours::default().accepts(t(h, m), Duration::minutes(30))
    }

    #[test]
    fn default_has_two_windows() {
        assert_eq!(ServiceHours::default().windows.len(), 2);
    }

    #[test]
    fn morning_boundaries() {
        assert!(ok(8, 0));
        assert!(!ok(7, 59));
        assert!(ok(11, 30));
        assert!(!ok(11, 31));
        assert!(ok(10, 15));
    }

    #[test]
    fn afternoon_boundaries() {
        assert!(ok(14, 30));
        assert!(!ok(14, 29));
        assert!(ok(16, 30));
        assert!(!ok(16, 31));
        assert!(!ok(17, 1));
    }

    #[test]
    fn midday_gap_is_closed() {
        for minute in 0..150 {
            let start = t(12, 0) + Duration::minutes(minute);
            assert!(
                !ServiceHours::default().accepts(start, Duration::minutes(30)),
                "{start} should be outside service hours"
            );
        }
    }

    #[test]
    fn seconds_are_ignored() {
        let start = NaiveTime::from_hms_opt(11, 30, 59).unwrap();
        assert!(ServiceHours::default().accepts(start, Duration::minutes(30)));
    }

    #[test]
    fn longer_appointments_must_still_end_by_closing() {
        let hours = ServiceHours::default();
        assert!(hours.accepts(t(11, 0), Duration::minutes(60)));
        assert!(!hours.accepts(t(11, 30), Duration::minutes(60)));
    }
}
