//! Handlers for clients, pets, treatments and the per-pet history.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use clinic_core::{
  Scheduler,
  history::{HistoryOrder, Visit},
  records::{Client, NewClient, NewPet, NewTreatment, Pet},
  store::RecordStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `POST /clients`
pub async fn create_client<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Json(body): Json<NewClient>,
) -> Result<impl IntoResponse, ApiError> {
  let client = sched.register_client(body).await?;
  Ok((StatusCode::CREATED, Json(client)))
}

/// `GET /clients/{id}`
pub async fn get_client<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Client>, ApiError> {
  Ok(Json(sched.get_client(id).await?))
}

/// `POST /pets`
pub async fn create_pet<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Json(body): Json<NewPet>,
) -> Result<impl IntoResponse, ApiError> {
  let pet = sched.register_pet(body).await?;
  Ok((StatusCode::CREATED, Json(pet)))
}

#[derive(Debug, Deserialize)]
pub struct PetParams {
  pub client_id: Option<Uuid>,
}

/// `GET /pets[?client_id]`
pub async fn list_pets<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Query(params): Query<PetParams>,
) -> Result<Json<Vec<Pet>>, ApiError> {
  Ok(Json(sched.list_pets(params.client_id).await?))
}

/// `GET /pets/{id}`
pub async fn get_pet<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Pet>, ApiError> {
  Ok(Json(sched.get_pet(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  #[serde(default)]
  pub order: HistoryOrder,
}

/// `GET /pets/{id}/history[?order=chronological|most_recent_first]`
pub async fn history<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<Visit>>, ApiError> {
  Ok(Json(sched.get_pet_history(id, params.order).await?))
}

/// `POST /treatments`
pub async fn record_treatment<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Json(body): Json<NewTreatment>,
) -> Result<impl IntoResponse, ApiError> {
  let treatment = sched.record_treatment(body).await?;
  Ok((StatusCode::CREATED, Json(treatment)))
}
