//! Handlers for `/appointments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/appointments` | Filters: `status`, `pet_id`, `client_id`, `veterinarian_id`, `date`, `from`, `to` |
//! | `POST`   | `/appointments` | Body: [`AppointmentDraft`]; 409 if the slot is taken |
//! | `GET`    | `/appointments/{id}` | 404 if not found |
//! | `PATCH`  | `/appointments/{id}` | Body: [`AppointmentPatch`] |
//! | `DELETE` | `/appointments/{id}` | Hard delete; `admin` role only |
//! | `POST`   | `/appointments/{id}/status` | Body: `{"status":"confirmed"}` |
//! | `POST`   | `/appointments/{id}/cancel` | |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use clinic_core::{
  Scheduler,
  appointment::{Appointment, AppointmentDraft, AppointmentFilter, AppointmentPatch},
  lifecycle::AppointmentStatus,
  store::RecordStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, role::Role};

/// `GET /appointments[?filters]`
pub async fn list<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
  Ok(Json(sched.list_appointments(filter).await?))
}

/// `POST /appointments`
pub async fn create<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Json(draft): Json<AppointmentDraft>,
) -> Result<impl IntoResponse, ApiError> {
  let appointment = sched.create_appointment(draft).await?;
  Ok((StatusCode::CREATED, Json(appointment)))
}

/// `GET /appointments/{id}`
pub async fn get_one<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
  Ok(Json(sched.get_appointment(id).await?))
}

/// `PATCH /appointments/{id}`
pub async fn update<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<AppointmentPatch>,
) -> Result<Json<Appointment>, ApiError> {
  Ok(Json(sched.update_appointment(id, patch).await?))
}

/// `DELETE /appointments/{id}`
pub async fn purge<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  role: Role,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  role.require_admin()?;
  sched.purge_appointment(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusBody {
  pub status: AppointmentStatus,
}

/// `POST /appointments/{id}/status`
pub async fn change_status<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Appointment>, ApiError> {
  Ok(Json(sched.change_status(id, body.status).await?))
}

/// `POST /appointments/{id}/cancel`
pub async fn cancel<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
  Ok(Json(sched.cancel_appointment(id).await?))
}
