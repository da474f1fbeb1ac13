//! The appointment status state machine.
//!
//! Every status change goes through [`AppointmentStatus::can_transition_to`];
//! callers never overwrite a status directly.
//!
//! ```text
//! Pending ──► Confirmed ──► Completed
//!    │            │
//!    └────────────┴──────► Cancelled
//! ```

use serde::{Deserialize, Serialize};

/// Where an appointment is in its lifecycle.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::EnumIter,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AppointmentStatus {
  /// Booked, not yet confirmed by staff. Every new appointment starts here.
  #[default]
  Pending,
  Confirmed,
  Completed,
  Cancelled,
}

impl AppointmentStatus {
  /// Statuses reachable in one step from `self`.
  pub fn allowed_transitions(self) -> &'static [AppointmentStatus] {
    use AppointmentStatus::*;
    match self {
      Pending => &[Confirmed, Cancelled],
      Confirmed => &[Completed, Cancelled],
      Completed | Cancelled => &[],
    }
  }

  pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
    self.allowed_transitions().contains(&next)
  }

  /// `Completed` and `Cancelled` have no outgoing edges.
  pub fn is_terminal(self) -> bool { self.allowed_transitions().is_empty() }

  /// Non-terminal appointments hold their slot; terminal ones never
  /// participate in conflicts.
  pub fn holds_slot(self) -> bool { !self.is_terminal() }
}
