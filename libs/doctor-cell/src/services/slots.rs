use chrono::{Duration, NaiveDate, NaiveTime};

use shared_models::scheduling::Appointment;

use crate::models::{AvailabilityError, Slot};

/// Length of every bookable slot, in minutes.
pub const SLOT_MINUTES: i64 = 30;

/// A window must start before it ends on the same day. Overnight windows are
/// not representable with a single time-of-day pair and are rejected.
pub fn validate_window(start: NaiveTime, end: NaiveTime) -> Result<(), AvailabilityError> {
    if start >= end {
        return Err(AvailabilityError::InvalidWindow(format!(
            "start {} must be before end {} on the same day",
            start.format("%H:%M"),
            end.format("%H:%M")
        )));
    }
    if end - start < Duration::minutes(SLOT_MINUTES) {
        return Err(AvailabilityError::InvalidWindow(format!(
            "window must fit at least one {}-minute slot",
            SLOT_MINUTES
        )));
    }
    Ok(())
}

/// Every slot of the window on `date`, ignoring existing bookings.
///
/// A trailing remainder shorter than a slot is dropped.
pub fn candidate_slots(
    start: NaiveTime,
    end: NaiveTime,
    date: NaiveDate,
    slot_minutes: i64,
) -> Result<Vec<Slot>, AvailabilityError> {
    validate_window(start, end)?;
    if slot_minutes <= 0 {
        return Err(AvailabilityError::InvalidWindow("slot length must be positive".to_string()));
    }

    let step = Duration::minutes(slot_minutes);
    let window_end = date.and_time(end).and_utc();
    let mut current = date.and_time(start).and_utc();
    let mut slots = Vec::new();

    while current + step <= window_end {
        slots.push(Slot {
            start_time: current,
            end_time: current + step,
        });
        current += step;
    }

    Ok(slots)
}

/// Bookable slots of the window on `date`, minus anything overlapping a
/// scheduled appointment. Ordered by start time.
pub fn expand_slots(
    start: NaiveTime,
    end: NaiveTime,
    date: NaiveDate,
    appointments: &[Appointment],
    slot_minutes: i64,
) -> Result<Vec<Slot>, AvailabilityError> {
    let slots = candidate_slots(start, end, date, slot_minutes)?
        .into_iter()
        .filter(|slot| {
            !appointments
                .iter()
                .any(|apt| apt.blocks_time() && apt.overlaps(slot.start_time, slot.end_time))
        })
        .collect();

    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{DateTime, TimeZone, Utc};
    use shared_models::scheduling::AppointmentStatus;
    use uuid::Uuid;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn appointment(start: DateTime<Utc>, end: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            status,
            patient_description: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn nine_to_five_yields_sixteen_disjoint_slots() {
        let slots = expand_slots(hm(9, 0), hm(17, 0), day(), &[], SLOT_MINUTES).unwrap();

        assert_eq!(slots.len(), 16);
        assert_eq!(slots[0].start_time, at(9, 0));
        assert_eq!(slots[15].end_time, at(17, 0));
        for pair in slots.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
            assert!(pair[0].start_time < pair[1].start_time);
        }
    }

    #[test]
    fn booked_slots_are_removed() {
        let booked = [
            appointment(at(10, 0), at(10, 30), AppointmentStatus::Scheduled),
            appointment(at(13, 15), at(13, 45), AppointmentStatus::Scheduled),
        ];
        let slots = expand_slots(hm(9, 0), hm(17, 0), day(), &booked, SLOT_MINUTES).unwrap();

        // 10:00 goes, and the off-grid booking takes out both 13:00 and 13:30.
        assert_eq!(slots.len(), 13);
        assert!(slots.iter().all(|s| s.start_time != at(10, 0)));
        assert!(slots.iter().all(|s| s.start_time != at(13, 0) && s.start_time != at(13, 30)));
    }

    #[test]
    fn cancelled_and_completed_appointments_do_not_block() {
        let history = [
            appointment(at(9, 0), at(9, 30), AppointmentStatus::Cancelled),
            appointment(at(9, 30), at(10, 0), AppointmentStatus::Completed),
        ];
        let slots = expand_slots(hm(9, 0), hm(10, 0), day(), &history, SLOT_MINUTES).unwrap();
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn adjacent_appointment_does_not_remove_neighbour() {
        let booked = [appointment(at(8, 30), at(9, 0), AppointmentStatus::Scheduled)];
        let slots = expand_slots(hm(9, 0), hm(10, 0), day(), &booked, SLOT_MINUTES).unwrap();
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn partial_trailing_slot_is_dropped() {
        let slots = candidate_slots(hm(9, 0), hm(10, 45), day(), SLOT_MINUTES).unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots.last().unwrap().end_time, at(10, 30));
    }

    #[test]
    fn inverted_or_overnight_window_is_rejected() {
        assert_matches!(
            expand_slots(hm(17, 0), hm(9, 0), day(), &[], SLOT_MINUTES),
            Err(AvailabilityError::InvalidWindow(_))
        );
        assert_matches!(validate_window(hm(22, 0), hm(2, 0)), Err(AvailabilityError::InvalidWindow(_)));
        assert_matches!(validate_window(hm(9, 0), hm(9, 0)), Err(AvailabilityError::InvalidWindow(_)));
        assert_matches!(validate_window(hm(9, 0), hm(9, 20)), Err(AvailabilityError::InvalidWindow(_)));
    }
}
