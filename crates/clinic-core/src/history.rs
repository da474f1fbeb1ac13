//! The per-pet clinical history: appointments joined with their treatments.
//!
//! A derived read model, never stored and always rebuilt from the appointment
//! and treatment records. Document rendering consumes it as-is.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{appointment::Appointment, records::Treatment};

/// Which end of the history comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
  /// Oldest first; the printable record.
  #[default]
  Chronological,
  /// Newest first; dashboards.
  MostRecentFirst,
}

/// One appointment and, if one was recorded, its treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
  pub appointment: Appointment,
  pub treatment:   Option<Treatment>,
}

/// Join `pet_id`'s appointments with the treatments linked to them.
///
/// Appointments belonging to other pets and treatments with no matching
/// appointment are ignored. Visits are ordered by date, then time, then
/// booking time, so the result is stable for same-slot records.
pub fn aggregate(
  pet_id: Uuid,
  appointments: Vec<Appointment>,
  treatments: Vec<Treatment>,
  order: HistoryOrder,
) -> Vec<Visit> {
  let mut by_appointment: HashMap<Uuid, Treatment> = treatments
    .into_iter()
    .map(|t| (t.appointment_id, t))
    .collect();

  let mut visits: Vec<Visit> = appointments
    .into_iter()
    .filter(|a| a.pet_id == pet_id)
    .map(|appointment| Visit {
      treatment: by_appointment.remove(&appointment.appointment_id),
      appointment,
    })
    .collect();

  visits.sort_by_key(|v| {
    (v.appointment.date, v.appointment.time, v.appointment.created_at)
  });
  if order == HistoryOrder::MostRecentFirst {
    visits.reverse();
  }
  visits
}
