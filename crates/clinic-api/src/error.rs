//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every body has the shape `{"error": <message>, "kind": <category>}` so a
//! client can tell "pick another slot" apart from "fix this field".

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use clinic_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Engine(#[from] CoreError),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  /// HTTP status and machine-readable category.
  pub fn classify(&self) -> (StatusCode, &'static str) {
    match self {
      ApiError::Engine(e) => match e {
        CoreError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation"),
        CoreError::SlotUnavailable { .. } => (StatusCode::CONFLICT, "slot_unavailable"),
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
        CoreError::InvalidTransition { .. } => {
          (StatusCode::CONFLICT, "invalid_transition")
        }
        CoreError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store"),
      },
      ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
      ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind) = self.classify();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string(), "kind": kind }))).into_response()
  }
}
