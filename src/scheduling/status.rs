// src/scheduling/status.rs

use chrono::{DateTime, Utc};

use super::TimeWindow;
use crate::models::AppointmentStatus;

/// Status as a pure function of the clock. Both ends of the window count as
/// in progress.
pub fn derive_status(now: DateTime<Utc>, window: &TimeWindow) -> AppointmentStatus {
    if now < window.start {
        AppointmentStatus::Pending
    } else if now <= window.end {
        AppointmentStatus::InProgress
    } else {
        AppointmentStatus::Finished
    }
}

/// The status to write back, if any. Only forward moves are returned, so a
/// persisted status never regresses and re-deriving inside the same band
/// yields `None`.
pub fn status_advance(
    persisted: AppointmentStatus,
    derived: AppointmentStatus,
) -> Option<AppointmentStatus> {
    (derived > persisted).then_some(derived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::models::AppointmentStatus::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn ten_oclock() -> TimeWindow {
        TimeWindow { start: at(10, 0), end: at(10, 30) }
    }

    #[test]
    fn bands_around_the_window() {
        let w = ten_oclock();
        assert_eq!(derive_status(at(9, 59), &w), Pending);
        assert_eq!(derive_status(at(10, 0), &w), InProgress);
        assert_eq!(derive_status(at(10, 15), &w), InProgress);
        assert_eq!(derive_status(at(10, 30), &w), InProgress);
        assert_eq!(derive_status(at(10, 31), &w), Finished);
    }

    #[test]
    fn derived_status_is_monotonic_in_time() {
        let w = ten_oclock();
        let mut last = Pending;
        for minute in 0..180 {
            let s = derive_status(at(9, 0) + chrono::Duration::minutes(minute), &w);
            assert!(s >= last);
            last = s;
        }
        assert_eq!(last, Finished);
    }

    #[test]
    fn advance_only_moves_forward() {
        assert_eq!(status_advance(Pending, InProgress), Some(InProgress));
        assert_eq!(status_advance(Pending, Finished), Some(Finished));
        assert_eq!(status_advance(InProgress, Finished), Some(Finished));
        assert_eq!(status_advance(Finished, Pending), None);
        assert_eq!(status_advance(InProgress, Pending), None);
    }

    #[test]
    fn same_band_needs_no_write() {
        assert_eq!(status_advance(Pending, Pending), None);
        assert_eq!(status_advance(InProgress, InProgress), None);
        assert_eq!(status_advance(Finished, Finished), None);
    }
}
