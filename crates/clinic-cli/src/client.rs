//! Async HTTP client wrapping the clinic JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveTime};
use clinic_core::{
  agenda::{MonthAgenda, Summary},
  appointment::{Appointment, AppointmentDraft, AppointmentFilter, AppointmentPatch},
  history::{HistoryOrder, Visit},
  lifecycle::AppointmentStatus,
  records::Pet,
  staff::Veterinarian,
  time::format_hhmm,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use uuid::Uuid;

/// Header carrying the caller's role; mirrors `clinic_api::role::ROLE_HEADER`.
const ROLE_HEADER: &str = "x-clinic-role";

/// Connection settings for the clinic API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
  pub base_url: String,
  /// Sent as `x-clinic-role` when present; the server treats absence as staff.
  pub role:     Option<String>,
}

/// The server's error body.
#[derive(Deserialize)]
struct ErrorBody {
  error: String,
  kind:  String,
}

/// Async HTTP client for the clinic JSON REST API.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn with_role(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.role {
      Some(role) => req.header(ROLE_HEADER, role),
      None => req,
    }
  }

  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
    let resp = self
      .with_role(req)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;

    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    match resp.json::<ErrorBody>().await {
      Ok(body) => Err(anyhow!("{what} → {status}: {} [{}]", body.error, body.kind)),
      Err(_) => Err(anyhow!("{what} → {status}")),
    }
  }

  async fn fetch<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    self
      .send(req, what)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising response to {what}"))
  }

  // ── Scheduling ────────────────────────────────────────────────────────────

  /// `GET /api/slots`
  pub async fn slots(&self) -> Result<Vec<String>> {
    self.fetch(self.client.get(self.url("/slots")), "GET /slots").await
  }

  /// `GET /api/availability?date&time`
  pub async fn availability(
    &self,
    date: NaiveDate,
    time: NaiveTime,
  ) -> Result<Vec<Veterinarian>> {
    let req = self
      .client
      .get(self.url("/availability"))
      .query(&[("date", date.to_string()), ("time", format_hhmm(time))]);
    self.fetch(req, "GET /availability").await
  }

  /// `GET /api/free-slots?date[&veterinarian_id]`
  pub async fn free_slots(
    &self,
    date: NaiveDate,
    veterinarian_id: Option<Uuid>,
  ) -> Result<Vec<String>> {
    let mut req = self
      .client
      .get(self.url("/free-slots"))
      .query(&[("date", date.to_string())]);
    if let Some(vet) = veterinarian_id {
      req = req.query(&[("veterinarian_id", vet.to_string())]);
    }
    self.fetch(req, "GET /free-slots").await
  }

  /// `GET /api/agenda?year&month`
  pub async fn agenda(&self, year: i32, month: u32) -> Result<MonthAgenda> {
    let req = self
      .client
      .get(self.url("/agenda"))
      .query(&[("year", year.to_string()), ("month", month.to_string())]);
    self.fetch(req, "GET /agenda").await
  }

  /// `GET /api/summary[?today]`
  pub async fn summary(&self, today: Option<NaiveDate>) -> Result<Summary> {
    let mut req = self.client.get(self.url("/summary"));
    if let Some(today) = today {
      req = req.query(&[("today", today.to_string())]);
    }
    self.fetch(req, "GET /summary").await
  }

  // ── Appointments ──────────────────────────────────────────────────────────

  /// `GET /api/appointments[?filters]`
  pub async fn list_appointments(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
    let req = self.client.get(self.url("/appointments")).query(filter);
    self.fetch(req, "GET /appointments").await
  }

  /// `POST /api/appointments`
  pub async fn book(&self, draft: &AppointmentDraft) -> Result<Appointment> {
    let req = self.client.post(self.url("/appointments")).json(draft);
    self.fetch(req, "POST /appointments").await
  }

  /// `PATCH /api/appointments/{id}`
  pub async fn update(&self, id: Uuid, patch: &AppointmentPatch) -> Result<Appointment> {
    let req = self
      .client
      .patch(self.url(&format!("/appointments/{id}")))
      .json(patch);
    self.fetch(req, "PATCH /appointments").await
  }

  /// `POST /api/appointments/{id}/status`
  pub async fn change_status(&self, id: Uuid, status: AppointmentStatus) -> Result<Appointment> {
    let req = self
      .client
      .post(self.url(&format!("/appointments/{id}/status")))
      .json(&json!({ "status": status }));
    self.fetch(req, "POST /appointments/{id}/status").await
  }

  /// `POST /api/appointments/{id}/cancel`
  pub async fn cancel(&self, id: Uuid) -> Result<Appointment> {
    let req = self.client.post(self.url(&format!("/appointments/{id}/cancel")));
    self.fetch(req, "POST /appointments/{id}/cancel").await
  }

  /// `DELETE /api/appointments/{id}`
  pub async fn purge(&self, id: Uuid) -> Result<()> {
    let req = self.client.delete(self.url(&format!("/appointments/{id}")));
    self.send(req, "DELETE /appointments/{id}").await?;
    Ok(())
  }

  // ── Records ───────────────────────────────────────────────────────────────

  /// `GET /api/pets/{id}`
  pub async fn pet(&self, id: Uuid) -> Result<Pet> {
    let req = self.client.get(self.url(&format!("/pets/{id}")));
    self.fetch(req, "GET /pets/{id}").await
  }

  /// `GET /api/pets/{id}/history?order`
  pub async fn history(&self, pet_id: Uuid, order: HistoryOrder) -> Result<Vec<Visit>> {
    let order = match order {
      HistoryOrder::Chronological => "chronological",
      HistoryOrder::MostRecentFirst => "most_recent_first",
    };
    let req = self
      .client
      .get(self.url(&format!("/pets/{pet_id}/history")))
      .query(&[("order", order)]);
    self.fetch(req, "GET /pets/{id}/history").await
  }

  /// `GET /api/veterinarians`
  pub async fn veterinarians(&self) -> Result<Vec<Veterinarian>> {
    self
      .fetch(self.client.get(self.url("/veterinarians")), "GET /veterinarians")
      .await
  }
}
