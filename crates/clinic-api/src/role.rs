//! The caller's role, as asserted by the identity provider in front of the
//! API. Only administrative operations consult it.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

pub const ROLE_HEADER: &str = "x-clinic-role";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  strum::Display,
  strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
  Admin,
  /// Assumed when the header is absent.
  #[default]
  Staff,
  Client,
}

impl Role {
  pub fn require_admin(self) -> Result<(), ApiError> {
    if self != Role::Admin {
      return Err(ApiError::Forbidden(format!("{self} may not perform this operation")));
    }
    Ok(())
  }
}

impl<S: Send + Sync> FromRequestParts<S> for Role {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(ROLE_HEADER) else {
      return Ok(Role::default());
    };
    value
      .to_str()
      .ok()
      .and_then(|s| s.trim().parse().ok())
      .ok_or_else(|| ApiError::BadRequest(format!("invalid {ROLE_HEADER} header")))
  }
}
