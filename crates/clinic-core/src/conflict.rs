//! Double-booking detection.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::{
  appointment::Appointment, policy::ConflictScope, slots::generate_slots,
};

/// A slot someone wants to book or move an appointment into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRequest {
  pub date:            NaiveDate,
  pub time:            NaiveTime,
  pub veterinarian_id: Option<Uuid>,
  /// The appointment being edited, which must not collide with itself.
  pub exclude:         Option<Uuid>,
}

impl SlotRequest {
  pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
    Self { date, time, veterinarian_id: None, exclude: None }
  }
}

/// The first open appointment occupying the requested slot, if any.
///
/// Only `Pending` and `Confirmed` appointments hold a slot; a cancelled or
/// completed one is always rebookable.
pub fn find_conflict<'a>(
  appointments: &'a [Appointment],
  request: &SlotRequest,
  scope: ConflictScope,
) -> Option<&'a Appointment> {
  appointments.iter().find(|a| {
    Some(a.appointment_id) != request.exclude
      && a.status.holds_slot()
      && a.date == request.date
      && a.time == request.time
      && scope.collides(a.veterinarian_id, request.veterinarian_id)
  })
}

pub fn has_conflict(
  appointments: &[Appointment],
  request: &SlotRequest,
  scope: ConflictScope,
) -> bool {
  find_conflict(appointments, request, scope).is_some()
}

/// Slots on `date` that a booking for `veterinarian_id` could still take.
///
/// `on_shift` further restricts the catalog (e.g. to a veterinarian's shift
/// coverage); pass `|_| true` for no restriction.
pub fn free_slots(
  appointments: &[Appointment],
  date: NaiveDate,
  veterinarian_id: Option<Uuid>,
  scope: ConflictScope,
  on_shift: impl Fn(NaiveTime) -> bool,
) -> Vec<NaiveTime> {
  generate_slots()
    .into_iter()
    .filter(|&time| on_shift(time))
    .filter(|&time| {
      let request = SlotRequest { date, time, veterinarian_id, exclude: None };
      !has_conflict(appointments, &request, scope)
    })
    .collect()
}
