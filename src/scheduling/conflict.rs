// src/scheduling/conflict.rs

use uuid::Uuid;

use super::TimeWindow;
use crate::models::Appointment;

/// Returns the id of the first appointment in `existing` whose interval
/// overlaps `candidate`. `exclude_id` is skipped, so an appointment being
/// edited is never compared against itself.
///
/// Store-side candidate queries are only a pre-filter; this is the rule that
/// decides.
pub fn find_conflict<'a, I>(
    candidate: &TimeWindow,
    existing: I,
    exclude_id: Option<Uuid>,
) -> Option<Uuid>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    existing
        .into_iter()
        .filter(|a| Some(a.appointment_id) != exclude_id)
        .find(|a| candidate.overlaps(&a.window()))
        .map(|a| a.appointment_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn has_conflict(candidate: &TimeWindow, existing: &[Appointment], exclude_id: Option<Uuid>) -> bool {
        find_conflict(candidate, existing, exclude_id).is_some()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn booked(start: DateTime<Utc>, end: DateTime<Utc>) -> Appointment {
        Appointment {
            appointment_id: Uuid::new_v4(),
            patient_name: "Ana".into(),
            contact: 3001234567,
            title: "Limpieza".into(),
            description: None,
            start_at: start,
            end_at: end,
            status: AppointmentStatus::Pending,
            created_at: start,
            updated_at: start,
        }
    }

    fn half_hour(h: u32, m: u32) -> TimeWindow {
        TimeWindow::starting_at(at(h, m), Duration::minutes(30)).unwrap()
    }

    #[test]
    fn empty_calendar_has_no_conflict() {
        assert!(!has_conflict(&half_hour(9, 0), &[], None));
    }

    #[test]
    fn back_to_back_is_not_a_conflict() {
        let existing = vec![booked(at(8, 30), at(9, 0)), booked(at(9, 30), at(10, 0))];
        assert!(!has_conflict(&half_hour(9, 0), &existing, None));
    }

    #[test]
    fn partial_overlap_reports_the_conflicting_id() {
        let existing = vec![booked(at(8, 0), at(8, 30)), booked(at(9, 0), at(9, 30))];
        let hit = find_conflict(&half_hour(9, 15), &existing, None);
        assert_eq!(hit, Some(existing[1].appointment_id));
    }

    #[test]
    fn identical_interval_conflicts() {
        let existing = vec![booked(at(10, 0), at(10, 30))];
        assert!(has_conflict(&half_hour(10, 0), &existing, None));
    }

    #[test]
    fn candidate_enclosing_existing_conflicts() {
        let existing = vec![booked(at(10, 10), at(10, 20))];
        assert!(has_conflict(&half_hour(10, 0), &existing, None));
    }

    #[test]
    fn excluded_appointment_is_ignored() {
        let me = booked(at(9, 0), at(9, 30));
        let id = me.appointment_id;
        let existing = vec![me];
        assert!(!has_conflict(&half_hour(9, 15), &existing, Some(id)));
        assert!(has_conflict(&half_hour(9, 15), &existing, Some(Uuid::new_v4())));
    }

    #[test]
    fn matches_the_interval_rule_on_a_grid() {
        let existing = vec![booked(at(10, 0), at(10, 30))];
        let other = existing[0].window();
        for minute in (0..=120).step_by(5) {
            let start = at(9, 0) + Duration::minutes(minute);
            let candidate = TimeWindow::starting_at(start, Duration::minutes(30)).unwrap();
            let expected = !(candidate.start >= other.end || candidate.end <= other.start);
            assert_eq!(has_conflict(&candidate, &existing, None), expected, "start {start}");
        }
    }
}
