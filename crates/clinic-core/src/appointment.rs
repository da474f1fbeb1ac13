//! Appointment records and the inputs that create or edit them.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{lifecycle::AppointmentStatus, time::hhmm};

// ─── Appointment ─────────────────────────────────────────────────────────────

/// A scheduled clinic visit binding a pet, its owner, a slot, and a status.
///
/// Holds non-owning references to the pet, client, and veterinarian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
  pub appointment_id:  Uuid,
  pub date:            NaiveDate,
  #[serde(with = "hhmm")]
  pub time:            NaiveTime,
  pub reason:          String,
  pub status:          AppointmentStatus,
  pub pet_id:          Uuid,
  pub client_id:       Uuid,
  /// Unassigned until staff pick a veterinarian (unless the policy requires
  /// one at booking time).
  pub veterinarian_id: Option<Uuid>,
  pub observations:    String,
  /// Server-assigned; never changes after creation.
  pub created_at:      DateTime<Utc>,
  pub updated_at:      Option<DateTime<Utc>>,
}

// ─── NewAppointment ──────────────────────────────────────────────────────────

/// A validated booking, ready to be written.
/// `appointment_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewAppointment {
  pub date:            NaiveDate,
  pub time:            NaiveTime,
  pub reason:          String,
  pub status:          AppointmentStatus,
  pub pet_id:          Uuid,
  pub client_id:       Uuid,
  pub veterinarian_id: Option<Uuid>,
  pub observations:    String,
}

// ─── Draft & patch ───────────────────────────────────────────────────────────

/// Caller input to [`crate::Scheduler::create_appointment`].
///
/// Required fields are `Option`s so that a missing one surfaces as a
/// validation error rather than a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentDraft {
  pub date:            Option<NaiveDate>,
  #[serde(default, with = "hhmm::option")]
  pub time:            Option<NaiveTime>,
  #[serde(default)]
  pub reason:          String,
  pub pet_id:          Option<Uuid>,
  pub client_id:       Option<Uuid>,
  pub veterinarian_id: Option<Uuid>,
  #[serde(default)]
  pub observations:    String,
}

/// Caller input to [`crate::Scheduler::update_appointment`]. Absent fields
/// are left unchanged. Status is not patchable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentPatch {
  pub date:            Option<NaiveDate>,
  #[serde(default, with = "hhmm::option")]
  pub time:            Option<NaiveTime>,
  pub reason:          Option<String>,
  /// `None` keeps the current assignment; `Some(None)` (JSON `null`)
  /// unassigns.
  #[serde(
    default,
    deserialize_with = "present_or_null",
    skip_serializing_if = "Option::is_none"
  )]
  pub veterinarian_id: Option<Option<Uuid>>,
  pub observations:    Option<String>,
}

/// Only called when the field is present, so `null` becomes `Some(None)`.
fn present_or_null<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<Uuid>>, D::Error> {
  Option::<Uuid>::deserialize(d).map(Some)
}

impl AppointmentPatch {
  pub fn is_empty(&self) -> bool {
    self.date.is_none()
      && self.time.is_none()
      && self.reason.is_none()
      && self.veterinarian_id.is_none()
      && self.observations.is_none()
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::RecordStore::list_appointments`].
/// Every set field narrows the result; results are ordered by date then time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentFilter {
  pub status:          Option<AppointmentStatus>,
  pub pet_id:          Option<Uuid>,
  pub client_id:       Option<Uuid>,
  pub veterinarian_id: Option<Uuid>,
  /// Exact day.
  pub date:            Option<NaiveDate>,
  /// Inclusive lower bound on the day.
  pub from:            Option<NaiveDate>,
  /// Inclusive upper bound on the day.
  pub to:              Option<NaiveDate>,
}

impl AppointmentFilter {
  pub fn on(date: NaiveDate) -> Self {
    Self { date: Some(date), ..Default::default() }
  }

  pub fn for_pet(pet_id: Uuid) -> Self {
    Self { pet_id: Some(pet_id), ..Default::default() }
  }

  pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
    Self { from: Some(from), to: Some(to), ..Default::default() }
  }

  /// In-memory equivalent of the store-side filter.
  pub fn matches(&self, a: &Appointment) -> bool {
    self.status.is_none_or(|s| a.status == s)
      && self.pet_id.is_none_or(|id| a.pet_id == id)
      && self.client_id.is_none_or(|id| a.client_id == id)
      && self.veterinarian_id.is_none_or(|id| a.veterinarian_id == Some(id))
      && self.date.is_none_or(|d| a.date == d)
      && self.from.is_none_or(|d| a.date >= d)
      && self.to.is_none_or(|d| a.date <= d)
  }
}
