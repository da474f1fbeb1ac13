//! Scheduling policy knobs, deserialised from the server configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a slot is locked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
  /// One shared calendar: a slot holds at most one open appointment,
  /// whichever veterinarian it is assigned to.
  #[default]
  Clinic,
  /// Each veterinarian has their own calendar. An unassigned booking still
  /// blocks the whole slot.
  Veterinarian,
}

impl ConflictScope {
  /// Whether an existing open booking for `existing` blocks a candidate for
  /// `candidate` in the same slot.
  pub fn collides(self, existing: Option<Uuid>, candidate: Option<Uuid>) -> bool {
    match (self, existing, candidate) {
      (Self::Clinic, ..) => true,
      (Self::Veterinarian, Some(a), Some(b)) => a == b,
      (Self::Veterinarian, ..) => true,
    }
  }
}

/// Rules applied by [`crate::Scheduler`] on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
  pub conflict_scope:         ConflictScope,
  /// Reject bookings that do not name a veterinarian.
  pub require_veterinarian:   bool,
  /// A named veterinarian must be active and on shift at the booked time.
  pub enforce_shift_coverage: bool,
  /// Refuse bookings (and moves) to a day before today.
  pub reject_past_dates:      bool,
}

impl Default for SchedulingPolicy {
  fn default() -> Self {
    Self {
      conflict_scope:         ConflictScope::Clinic,
      require_veterinarian:   false,
      enforce_shift_coverage: true,
      reject_past_dates:      true,
    }
  }
}
