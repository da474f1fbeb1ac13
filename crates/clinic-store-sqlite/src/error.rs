//! Error type for `clinic-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(#[from] chrono::ParseError),

  /// A column held a value outside its domain (status, weekday, ...).
  #[error("bad {column} value: {value:?}")]
  BadValue { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
