//! Handlers for slot, availability and calendar queries.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/slots` | The fixed daily catalog |
//! | `GET`  | `/availability` | `?date&time`; empty list without `time` |
//! | `GET`  | `/conflicts` | `?date&time[&exclude_id][&veterinarian_id]` |
//! | `GET`  | `/free-slots` | `?date[&veterinarian_id]` |
//! | `GET`  | `/agenda` | `?year&month` |
//! | `GET`  | `/summary` | `?today`, defaults to the scheduler's clock |

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{NaiveDate, NaiveTime};
use clinic_core::{
  Scheduler,
  agenda::{MonthAgenda, Summary},
  conflict::SlotRequest,
  staff::Veterinarian,
  store::RecordStore,
  time::{format_hhmm, hhmm},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

fn as_hhmm(times: Vec<NaiveTime>) -> Vec<String> {
  times.into_iter().map(format_hhmm).collect()
}

/// `GET /slots`
pub async fn slots<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
) -> Json<Vec<String>> {
  Json(as_hhmm(sched.generate_slots()))
}

// ─── Availability ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
  pub date: NaiveDate,
  #[serde(default, with = "hhmm::option")]
  pub time: Option<NaiveTime>,
}

/// `GET /availability?date=<YYYY-MM-DD>[&time=<HH:MM>]`
pub async fn availability<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Query(params): Query<AvailabilityParams>,
) -> Result<Json<Vec<Veterinarian>>, ApiError> {
  let vets = sched
    .resolve_available_veterinarians(params.date, params.time)
    .await?;
  Ok(Json(vets))
}

// ─── Conflicts ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ConflictParams {
  pub date:            NaiveDate,
  #[serde(with = "hhmm")]
  pub time:            NaiveTime,
  pub exclude_id:      Option<Uuid>,
  pub veterinarian_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConflictAnswer {
  pub conflict: bool,
}

/// `GET /conflicts?date&time[&exclude_id][&veterinarian_id]`
pub async fn conflicts<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Query(params): Query<ConflictParams>,
) -> Result<Json<ConflictAnswer>, ApiError> {
  let conflict = sched
    .has_conflict(SlotRequest {
      date:            params.date,
      time:            params.time,
      veterinarian_id: params.veterinarian_id,
      exclude:         params.exclude_id,
    })
    .await?;
  Ok(Json(ConflictAnswer { conflict }))
}

// ─── Free slots ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FreeSlotParams {
  pub date:            NaiveDate,
  pub veterinarian_id: Option<Uuid>,
}

/// `GET /free-slots?date[&veterinarian_id]`
pub async fn free_slots<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Query(params): Query<FreeSlotParams>,
) -> Result<Json<Vec<String>>, ApiError> {
  let free = sched.free_slots(params.date, params.veterinarian_id).await?;
  Ok(Json(as_hhmm(free)))
}

// ─── Calendar ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AgendaParams {
  pub year:  i32,
  pub month: u32,
}

/// `GET /agenda?year&month`
pub async fn agenda<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Query(params): Query<AgendaParams>,
) -> Result<Json<MonthAgenda>, ApiError> {
  Ok(Json(sched.month_agenda(params.year, params.month).await?))
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
  pub today: Option<NaiveDate>,
}

/// `GET /summary[?today]`
pub async fn summary<S: RecordStore + 'static>(
  State(sched): State<Scheduler<S>>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<Summary>, ApiError> {
  let today = params.today.unwrap_or_else(|| sched.today());
  Ok(Json(sched.summary(today).await?))
}
