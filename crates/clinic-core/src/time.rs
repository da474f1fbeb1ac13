//! Time-of-day helpers.
//!
//! Times cross every boundary (JSON, SQLite, CLI) as zero-padded `"HH:MM"`,
//! so lexicographic and chronological order agree. Input also accepts
//! `"HH:MM:SS"` because some record sources append seconds; the seconds are
//! dropped on the way in, so a parsed time always survives a round trip.

use chrono::{NaiveTime, Timelike};

pub fn parse_hhmm(s: &str) -> Result<NaiveTime, chrono::ParseError> {
  let s = s.trim();
  NaiveTime::parse_from_str(s, "%H:%M")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
    .map(whole_minute)
}

/// `t` with seconds and fractions cleared.
pub fn whole_minute(t: NaiveTime) -> NaiveTime {
  NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

pub fn format_hhmm(t: NaiveTime) -> String { t.format("%H:%M").to_string() }

/// `#[serde(with = "clinic_core::time::hhmm")]` for `NaiveTime` fields.
pub mod hhmm {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer};

  pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&super::format_hhmm(*t))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(d)?;
    super::parse_hhmm(&raw).map_err(serde::de::Error::custom)
  }

  /// Same as the parent module, for `Option<NaiveTime>`. Pair with
  /// `#[serde(default)]` so a missing field deserialises to `None`.
  pub mod option {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
      t: &Option<NaiveTime>,
      s: S,
    ) -> Result<S::Ok, S::Error> {
      match t {
        Some(t) => s.serialize_some(&super::super::format_hhmm(*t)),
        None => s.serialize_none(),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
      d: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
      let raw = Option::<String>::deserialize(d)?;
      match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => super::super::parse_hhmm(s)
          .map(Some)
          .map_err(serde::de::Error::custom),
      }
    }
  }
}
