//! Error types for `clinic-core`.
//!
//! Every engine operation reports exactly one of these categories back to its
//! caller. Callers present them differently, so they are never folded into a
//! single "failed" variant.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::lifecycle::AppointmentStatus;

/// The kind of record an id refers to, used in [`Error::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Resource {
  Appointment,
  Veterinarian,
  Shift,
  Pet,
  Client,
  Treatment,
}

/// Input that was rejected before it could reach the record store (or that
/// contradicts records already there).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("{0} is not a bookable slot")]
  OffGridTime(NaiveTime),

  #[error("client {client_id} does not own pet {pet_id}")]
  ClientMismatch { client_id: Uuid, pet_id: Uuid },

  #[error("veterinarian {veterinarian_id} is not on shift at {date} {time}")]
  VeterinarianUnavailable {
    veterinarian_id: Uuid,
    date:            NaiveDate,
    time:            NaiveTime,
  },

  #[error("shift must start before it ends ({start} >= {end})")]
  InvalidShiftWindow { start: NaiveTime, end: NaiveTime },

  #[error("appointment {0} is {1}; treatments need a confirmed or completed appointment")]
  AppointmentNotTreatable(Uuid, AppointmentStatus),

  #[error("appointment {0} already has a treatment")]
  TreatmentExists(Uuid),

  #[error("{date} is in the past (today is {today})")]
  DateInPast { date: NaiveDate, today: NaiveDate },

  #[error("no such month: {year}-{month:02}")]
  InvalidMonth { year: i32, month: u32 },
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),

  #[error("slot {date} {} is already taken", .time.format("%H:%M"))]
  SlotUnavailable { date: NaiveDate, time: NaiveTime },

  #[error("{resource} not found: {id}")]
  NotFound { resource: Resource, id: Uuid },

  #[error("cannot move appointment from {from} to {to}")]
  InvalidTransition {
    from: AppointmentStatus,
    to:   AppointmentStatus,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(resource: Resource, id: Uuid) -> Self {
    Self::NotFound { resource, id }
  }

  /// Wrap a record-store failure without altering it.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
