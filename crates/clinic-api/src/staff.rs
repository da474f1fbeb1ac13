//! Handlers for veterinarians and their shifts.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/veterinarians` | Active and inactive, by name |
//! | `POST`   | `/veterinarians` | Body: [`NewVeterinarian`] |
//! | `GET`    | `/veterinarians/{id}` | |
//! | `PATCH`  | `/veterinarians/{id}` | Body: [`VeterinarianPatch`]; `{"active":false}` deactivates |
//! | `GET`    | `/veterinarians/{id}/shifts` | |
//! | `POST`   | `/veterinarians/{id}/shifts` | Body: [`ShiftWindow`] |
//! | `PUT`    | `/shifts/{id}` | Body: [`ShiftWindow`] |
//! | `DELETE` | `/shifts/{id}` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use clinic_core::{
  Scheduler,
  staff::{NewVeterinarian, Shift, ShiftWindow, Veterinarian, VeterinarianPatch},
  store::RecordStore,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Veterinarians ────────────────────────────────────────────────────────────

/// `GET /veterinarians`
pub async fn list<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
) -> Result<Json<Vec<Veterinarian>>, ApiError> {
  Ok(Json(sched.list_veterinarians().await?))
}

/// `POST /veterinarians`
pub async fn register<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Json(body): Json<NewVeterinarian>,
) -> Result<impl IntoResponse, ApiError> {
  let vet = sched.register_veterinarian(body).await?;
  Ok((StatusCode::CREATED, Json(vet)))
}

/// `GET /veterinarians/{id}`
pub async fn get_one<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Veterinarian>, ApiError> {
  Ok(Json(sched.get_veterinarian(id).await?))
}

/// `PATCH /veterinarians/{id}`
pub async fn update<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<VeterinarianPatch>,
) -> Result<Json<Veterinarian>, ApiError> {
  Ok(Json(sched.update_veterinarian(id, patch).await?))
}

// ─── Shifts ───────────────────────────────────────────────────────────────────

/// `GET /veterinarians/{id}/shifts`
pub async fn list_shifts<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Shift>>, ApiError> {
  Ok(Json(sched.list_shifts(Some(id)).await?))
}

/// `POST /veterinarians/{id}/shifts`
pub async fn add_shift<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
  Json(window): Json<ShiftWindow>,
) -> Result<impl IntoResponse, ApiError> {
  let shift = sched.add_shift(id, window).await?;
  Ok((StatusCode::CREATED, Json(shift)))
}

/// `PUT /shifts/{id}`
pub async fn update_shift<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
  Json(window): Json<ShiftWindow>,
) -> Result<Json<Shift>, ApiError> {
  Ok(Json(sched.update_shift(id, window).await?))
}

/// `DELETE /shifts/{id}`
pub async fn remove_shift<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  sched.remove_shift(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
