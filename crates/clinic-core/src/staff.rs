//! Veterinarians and their recurring weekly shifts.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::{hhmm, whole_minute};

// ─── Veterinarian ────────────────────────────────────────────────────────────

/// A staff member who can be assigned to appointments.
///
/// Deactivation is a soft flag: historical appointments keep a valid
/// reference, and the veterinarian's shifts are kept but ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Veterinarian {
  pub veterinarian_id: Uuid,
  pub name:            String,
  pub specialty:       Option<String>,
  pub phone:           Option<String>,
  pub email:           Option<String>,
  pub active:          bool,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::insert_veterinarian`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVeterinarian {
  pub name:      String,
  pub specialty: Option<String>,
  pub phone:     Option<String>,
  pub email:     Option<String>,
  #[serde(default = "default_active")]
  pub active:    bool,
}

fn default_active() -> bool { true }

impl NewVeterinarian {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:      name.into(),
      specialty: None,
      phone:     None,
      email:     None,
      active:    true,
    }
  }
}

/// Partial edit of a veterinarian; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VeterinarianPatch {
  pub name:      Option<String>,
  pub specialty: Option<String>,
  pub phone:     Option<String>,
  pub email:     Option<String>,
  pub active:    Option<bool>,
}

// ─── Shift ───────────────────────────────────────────────────────────────────

/// One recurring weekly working window. A veterinarian may own several,
/// including overlapping ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
  pub shift_id:        Uuid,
  pub veterinarian_id: Uuid,
  pub weekday:         Weekday,
  #[serde(with = "hhmm")]
  pub start:           NaiveTime,
  #[serde(with = "hhmm")]
  pub end:             NaiveTime,
}

impl Shift {
  /// Both boundaries are inclusive: a 09:00–12:00 shift covers 09:00 and
  /// 12:00 but not 12:30.
  pub fn covers(&self, weekday: Weekday, time: NaiveTime) -> bool {
    self.weekday == weekday && self.start <= time && time <= self.end
  }
}

/// The editable part of a shift, shared by create and edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
  pub weekday: Weekday,
  #[serde(with = "hhmm")]
  pub start:   NaiveTime,
  #[serde(with = "hhmm")]
  pub end:     NaiveTime,
}

impl ShiftWindow {
  /// Shifts are stored to the minute.
  pub fn whole_minutes(self) -> Self {
    Self {
      start: whole_minute(self.start),
      end: whole_minute(self.end),
      ..self
    }
  }
}

/// Input to [`crate::store::RecordStore::insert_shift`].
#[derive(Debug, Clone)]
pub struct NewShift {
  pub veterinarian_id: Uuid,
  pub window:          ShiftWindow,
}
