//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `clinic-store-sqlite`).
//! The [`Scheduler`](crate::Scheduler) owns every business rule; a store only
//! persists, assigns ids and timestamps, and answers queries.

use std::future::Future;

use uuid::Uuid;

use crate::{
  appointment::{Appointment, AppointmentFilter, NewAppointment},
  records::{Client, NewClient, NewPet, NewTreatment, Pet, Treatment},
  staff::{NewShift, NewVeterinarian, Shift, Veterinarian},
};

/// Abstraction over a clinic record store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Clients & pets ────────────────────────────────────────────────────

  fn insert_client(
    &self,
    input: NewClient,
  ) -> impl Future<Output = Result<Client, Self::Error>> + Send + '_;

  fn get_client(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  fn insert_pet(
    &self,
    input: NewPet,
  ) -> impl Future<Output = Result<Pet, Self::Error>> + Send + '_;

  fn get_pet(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Pet>, Self::Error>> + Send + '_;

  /// All pets, or only those owned by `owner`. Ordered by name.
  fn list_pets(
    &self,
    owner: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Pet>, Self::Error>> + Send + '_;

  // ── Veterinarians ─────────────────────────────────────────────────────

  fn insert_veterinarian(
    &self,
    input: NewVeterinarian,
  ) -> impl Future<Output = Result<Veterinarian, Self::Error>> + Send + '_;

  fn get_veterinarian(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Veterinarian>, Self::Error>> + Send + '_;

  /// Every veterinarian, active or not, ordered by name.
  fn list_veterinarians(
    &self,
  ) -> impl Future<Output = Result<Vec<Veterinarian>, Self::Error>> + Send + '_;

  /// Overwrite the stored row. Returns `None` if it does not exist.
  fn update_veterinarian(
    &self,
    vet: Veterinarian,
  ) -> impl Future<Output = Result<Option<Veterinarian>, Self::Error>> + Send + '_;

  // ── Shifts ────────────────────────────────────────────────────────────

  fn insert_shift(
    &self,
    input: NewShift,
  ) -> impl Future<Output = Result<Shift, Self::Error>> + Send + '_;

  fn get_shift(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Shift>, Self::Error>> + Send + '_;

  /// All shifts, or only `veterinarian_id`'s. Ordered by weekday then start.
  fn list_shifts(
    &self,
    veterinarian_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Shift>, Self::Error>> + Send + '_;

  fn update_shift(
    &self,
    shift: Shift,
  ) -> impl Future<Output = Result<Option<Shift>, Self::Error>> + Send + '_;

  /// Returns `false` if no such shift existed.
  fn delete_shift(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Appointments ──────────────────────────────────────────────────────

  /// Persist a booking. `appointment_id` and `created_at` are set by the
  /// store.
  fn insert_appointment(
    &self,
    input: NewAppointment,
  ) -> impl Future<Output = Result<Appointment, Self::Error>> + Send + '_;

  fn get_appointment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Appointment>, Self::Error>> + Send + '_;

  /// Appointments matching `filter`, ordered by date then time.
  fn list_appointments(
    &self,
    filter: AppointmentFilter,
  ) -> impl Future<Output = Result<Vec<Appointment>, Self::Error>> + Send + '_;

  /// Overwrite every mutable column and stamp `updated_at`. Returns `None` if
  /// the appointment does not exist.
  fn update_appointment(
    &self,
    appointment: Appointment,
  ) -> impl Future<Output = Result<Option<Appointment>, Self::Error>> + Send + '_;

  /// Hard delete, together with any linked treatment. Returns `false` if no
  /// such appointment existed.
  fn delete_appointment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Treatments ────────────────────────────────────────────────────────

  /// Persist a treatment together with its medications, atomically.
  fn insert_treatment(
    &self,
    input: NewTreatment,
  ) -> impl Future<Output = Result<Treatment, Self::Error>> + Send + '_;

  fn get_treatment_for_appointment(
    &self,
    appointment_id: Uuid,
  ) -> impl Future<Output = Result<Option<Treatment>, Self::Error>> + Send + '_;

  /// Every treatment linked to one of `pet_id`'s appointments.
  fn list_treatments_for_pet(
    &self,
    pet_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Treatment>, Self::Error>> + Send + '_;
}
