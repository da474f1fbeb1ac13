//! The fixed catalog of bookable times of day.

use chrono::{NaiveTime, Timelike};

/// First bookable minute of the clinic day (08:00).
pub const OPENING_MINUTE: u32 = 8 * 60;
/// Last bookable minute of the clinic day (19:30).
pub const LAST_SLOT_MINUTE: u32 = 19 * 60 + 30;
pub const SLOT_MINUTES: u32 = 30;
pub const SLOTS_PER_DAY: usize =
  ((LAST_SLOT_MINUTE - OPENING_MINUTE) / SLOT_MINUTES + 1) as usize;

/// Every bookable slot of one clinic day, ascending: 08:00, 08:30, … 19:30.
pub fn generate_slots() -> Vec<NaiveTime> {
  (OPENING_MINUTE..=LAST_SLOT_MINUTE)
    .step_by(SLOT_MINUTES as usize)
    .filter_map(|m| NaiveTime::from_hms_opt(m / 60, m % 60, 0))
    .collect()
}

/// Whether `time` is exactly one of the slots in [`generate_slots`].
pub fn is_slot(time: NaiveTime) -> bool {
  let minute = time.hour() * 60 + time.minute();
  time.second() == 0
    && time.nanosecond() == 0
    && (OPENING_MINUTE..=LAST_SLOT_MINUTE).contains(&minute)
    && (minute - OPENING_MINUTE) % SLOT_MINUTES == 0
}
