//! JSON REST API for the clinic scheduling engine.
//!
//! Exposes an axum [`Router`] backed by a [`Scheduler`] over any
//! [`RecordStore`]. Identity, TLS, and transport concerns are the caller's
//! responsibility; the caller's role arrives in the `x-clinic-role` header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", clinic_api::api_router(scheduler.clone()))
//! ```

pub mod appointments;
pub mod error;
pub mod records;
pub mod role;
pub mod scheduling;
pub mod staff;

use axum::{
  Router,
  routing::{get, post, put},
};
use clinic_core::{Scheduler, store::RecordStore};

pub use error::ApiError;
pub use role::{ROLE_HEADER, Role};

/// Build a fully-materialised API router for `scheduler`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(scheduler: Scheduler<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Scheduling
    .route("/slots", get(scheduling::slots::<S>))
    .route("/availability", get(scheduling::availability::<S>))
    .route("/conflicts", get(scheduling::conflicts::<S>))
    .route("/free-slots", get(scheduling::free_slots::<S>))
    .route("/agenda", get(scheduling::agenda::<S>))
    .route("/summary", get(scheduling::summary::<S>))
    // Appointments
    .route(
      "/appointments",
      get(appointments::list::<S>).post(appointments::create::<S>),
    )
    .route(
      "/appointments/{id}",
      get(appointments::get_one::<S>)
        .patch(appointments::update::<S>)
        .delete(appointments::purge::<S>),
    )
    .route("/appointments/{id}/status", post(appointments::change_status::<S>))
    .route("/appointments/{id}/cancel", post(appointments::cancel::<S>))
    // Staff
    .route("/veterinarians", get(staff::list::<S>).post(staff::register::<S>))
    .route(
      "/veterinarians/{id}",
      get(staff::get_one::<S>).patch(staff::update::<S>),
    )
    .route(
      "/veterinarians/{id}/shifts",
      get(staff::list_shifts::<S>).post(staff::add_shift::<S>),
    )
    .route(
      "/shifts/{id}",
      put(staff::update_shift::<S>).delete(staff::remove_shift::<S>),
    )
    // Records
    .route("/clients", post(records::create_client::<S>))
    .route("/clients/{id}", get(records::get_client::<S>))
    .route("/pets", get(records::list_pets::<S>).post(records::create_pet::<S>))
    .route("/pets/{id}", get(records::get_pet::<S>))
    .route("/pets/{id}/history", get(records::history::<S>))
    .route("/treatments", post(records::record_treatment::<S>))
    .with_state(scheduler)
}
