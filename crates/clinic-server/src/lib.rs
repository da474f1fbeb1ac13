//! HTTP server wiring for the clinic scheduling service.
//!
//! Holds the runtime configuration and assembles the application router;
//! `main.rs` only parses flags, loads config, and serves.

use std::path::PathBuf;

use axum::Router;
use clinic_core::{Scheduler, policy::SchedulingPolicy, store::RecordStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CLINIC_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub scheduling: SchedulingPolicy,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("clinic.db") }

impl ServerConfig {
  /// Layer `path` (optional) under the `CLINIC_` environment.
  ///
  /// Nested keys use a double underscore, e.g.
  /// `CLINIC_SCHEDULING__CONFLICT_SCOPE=veterinarian`.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.into()).required(false))
      .add_source(
        config::Environment::with_prefix("CLINIC")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, with request tracing.
pub fn app<S>(scheduler: Scheduler<S>) -> Router
where
  S: RecordStore + 'static,
{
  Router::new()
    .nest("/api", clinic_api::api_router(scheduler))
    .layer(TraceLayer::new_for_http())
}
