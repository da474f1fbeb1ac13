//! Which veterinarians can serve a candidate slot.

use std::collections::HashSet;

use chrono::{NaiveTime, Weekday};
use uuid::Uuid;

use crate::staff::{Shift, Veterinarian};

/// Veterinarians that are active and own at least one shift on `weekday`
/// covering `time`, in the order they appear in `veterinarians`.
///
/// With no `time` the result is empty: nobody is offered before a slot has
/// been picked. An empty result is a normal answer, not an error.
pub fn resolve<'a>(
  veterinarians: &'a [Veterinarian],
  shifts: &[Shift],
  weekday: Weekday,
  time: Option<NaiveTime>,
) -> Vec<&'a Veterinarian> {
  let Some(time) = time else {
    return Vec::new();
  };

  let on_shift: HashSet<Uuid> = shifts
    .iter()
    .filter(|s| s.covers(weekday, time))
    .map(|s| s.veterinarian_id)
    .collect();

  veterinarians
    .iter()
    .filter(|v| v.active && on_shift.contains(&v.veterinarian_id))
    .collect()
}

/// Whether one veterinarian is eligible; same rule as [`resolve`].
pub fn is_eligible(
  veterinarian: &Veterinarian,
  shifts: &[Shift],
  weekday: Weekday,
  time: NaiveTime,
) -> bool {
  veterinarian.active
    && shifts.iter().any(|s| {
      s.veterinarian_id == veterinarian.veterinarian_id && s.covers(weekday, time)
    })
}
