// src/scheduling/mod.rs

pub mod conflict;
pub mod scheduler;
pub mod service_hours;
pub mod status;

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};

pub use conflict::find_conflict;
pub use scheduler::AppointmentScheduler;
pub use service_hours::ServiceHours;
pub use status::{derive_status, status_advance};

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// `None` when the end falls outside the representable date range.
    pub fn starting_at(start: DateTime<Utc>, length: Duration) -> Option<Self> {
        let end = start.checked_add_signed(length)?;
        Some(Self { start, end })
    }

    /// Back-to-back windows (one ends exactly where the other starts) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        !(self.start >= other.end || self.end <= other.start)
    }
}

/// Clinic-wide parameters the scheduler validates against.
#[derive(Debug, Clone)]
pub struct SchedulingRules {
    pub clinic_offset: FixedOffset,
    pub appointment_length: Duration,
    pub service_hours: ServiceHours,
}

impl SchedulingRules {
    pub fn new(clinic_offset: FixedOffset, appointment_minutes: i64) -> Self {
        Self {
            clinic_offset,
            appointment_length: Duration::minutes(appointment_minutes),
            service_hours: ServiceHours::default(),
        }
    }

    /// The slot an appointment starting at `start` occupies. Appointments are
    /// booked at minute precision, so seconds are dropped. `None` for starts
    /// so close to the end of the calendar that the slot can't be represented.
    pub fn window_for(&self, start: DateTime<Utc>) -> Option<TimeWindow> {
        TimeWindow::starting_at(truncate_to_minute(start), self.appointment_length)
    }

    pub fn is_within_service_hours(&self, start: DateTime<Utc>) -> bool {
        let local = start.with_timezone(&self.clinic_offset);
        self.service_hours
            .accepts(local.time(), self.appointment_length)
    }
}

pub(crate) fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let first = TimeWindow::starting_at(at(9, 0), Duration::minutes(30)).unwrap();
        let second = TimeWindow::starting_at(at(9, 30), Duration::minutes(30)).unwrap();
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn partial_and_nested_windows_overlap() {
        let base = TimeWindow { start: at(9, 0), end: at(10, 0) };
        let partial = TimeWindow { start: at(9, 45), end: at(10, 15) };
        let nested = TimeWindow { start: at(9, 10), end: at(9, 20) };
        assert!(base.overlaps(&partial));
        assert!(base.overlaps(&nested));
        assert!(nested.overlaps(&base));
    }

    #[test]
    fn service_hours_use_clinic_local_time() {
        // UTC-5: 13:00 UTC is 08:00 at the clinic.
        let rules = SchedulingRules::new(FixedOffset::west_opt(5 * 3600).unwrap(), 30);
        assert!(rules.is_within_service_hours(at(13, 0)));
        assert!(!rules.is_within_service_hours(at(8, 0)));
    }

    #[test]
    fn window_for_uses_appointment_length() {
        let rules = SchedulingRules::new(FixedOffset::east_opt(0).unwrap(), 30);
        let w = rules.window_for(at(9, 0) + Duration::seconds(59)).unwrap();
        assert_eq!(w.start, at(9, 0));
        assert_eq!(w.end, at(9, 30));
    }

    #[test]
    fn window_past_the_end_of_the_calendar_is_rejected() {
        let rules = SchedulingRules::new(FixedOffset::east_opt(0).unwrap(), 30);
        let last_minute: DateTime<Utc> = "+262142-12-31T23:59:00Z".parse().unwrap();
        assert_eq!(rules.window_for(last_minute), None);
        assert_eq!(rules.window_for(DateTime::<Utc>::MAX_UTC), None);
    }
}
