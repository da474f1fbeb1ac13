//! Records the engine reads but does not own: clients, pets, treatments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
  pub client_id:  Uuid,
  pub name:       String,
  pub phone:      Option<String>,
  pub email:      Option<String>,
  pub address:    Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
  pub name:    String,
  pub phone:   Option<String>,
  pub email:   Option<String>,
  pub address: Option<String>,
}

// ─── Pet ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
  pub pet_id:     Uuid,
  /// The owning client.
  pub client_id:  Uuid,
  pub name:       String,
  pub species:    String,
  pub breed:      Option<String>,
  /// Age in years.
  pub age:        Option<u32>,
  pub sex:        Option<String>,
  pub weight_kg:  Option<f64>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPet {
  pub client_id: Uuid,
  pub name:      String,
  pub species:   String,
  pub breed:     Option<String>,
  pub age:       Option<u32>,
  pub sex:       Option<String>,
  pub weight_kg: Option<f64>,
}

// ─── Treatment ───────────────────────────────────────────────────────────────

/// One prescribed medication line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
  pub name:     String,
  pub dosage:   String,
  pub duration: String,
}

/// The clinical outcome of one appointment. At most one per appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treatment {
  pub treatment_id:        Uuid,
  pub appointment_id:      Uuid,
  pub diagnosis:           String,
  pub indicated_treatment: String,
  pub recommendations:     String,
  /// Kept in prescription order.
  pub medications:         Vec<Medication>,
  pub created_at:          DateTime<Utc>,
}

/// Input to [`crate::Scheduler::record_treatment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTreatment {
  pub appointment_id:      Uuid,
  pub diagnosis:           String,
  #[serde(default)]
  pub indicated_treatment: String,
  #[serde(default)]
  pub recommendations:     String,
  #[serde(default)]
  pub medications:         Vec<Medication>,
}
