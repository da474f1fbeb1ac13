//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings; UUIDs are hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use clinic_core::{
  appointment::Appointment,
  lifecycle::AppointmentStatus,
  records::{Client, Medication, Pet, Treatment},
  staff::{Shift, Veterinarian},
  time::{format_hhmm, parse_hhmm},
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
}

pub fn encode_time(t: NaiveTime) -> String { format_hhmm(t) }

pub fn decode_time(s: &str) -> Result<NaiveTime> { Ok(parse_hhmm(s)?) }

const WEEKDAYS: [Weekday; 7] = [
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat,
  Weekday::Sun,
];

pub fn encode_weekday(w: Weekday) -> i64 { i64::from(w.num_days_from_monday()) }

pub fn decode_weekday(n: i64) -> Result<Weekday> {
  usize::try_from(n)
    .ok()
    .and_then(|i| WEEKDAYS.get(i).copied())
    .ok_or_else(|| Error::BadValue { column: "weekday", value: n.to_string() })
}

pub fn encode_status(s: AppointmentStatus) -> &'static str { s.into() }

pub fn decode_status(s: &str) -> Result<AppointmentStatus> {
  AppointmentStatus::from_str(s)
    .map_err(|_| Error::BadValue { column: "status", value: s.to_owned() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const CLIENT_COLUMNS: &str = "client_id, name, phone, email, address, created_at";

/// Raw values read directly from a `clients` row.
pub struct RawClient {
  pub client_id:  String,
  pub name:       String,
  pub phone:      Option<String>,
  pub email:      Option<String>,
  pub address:    Option<String>,
  pub created_at: String,
}

impl RawClient {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      client_id:  row.get(0)?,
      name:       row.get(1)?,
      phone:      row.get(2)?,
      email:      row.get(3)?,
      address:    row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_client(self) -> Result<Client> {
    Ok(Client {
      client_id:  decode_uuid(&self.client_id)?,
      name:       self.name,
      phone:      self.phone,
      email:      self.email,
      address:    self.address,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const PET_COLUMNS: &str =
  "pet_id, client_id, name, species, breed, age, sex, weight_kg, created_at";

pub struct RawPet {
  pub pet_id:     String,
  pub client_id:  String,
  pub name:       String,
  pub species:    String,
  pub breed:      Option<String>,
  pub age:        Option<u32>,
  pub sex:        Option<String>,
  pub weight_kg:  Option<f64>,
  pub created_at: String,
}

impl RawPet {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pet_id:     row.get(0)?,
      client_id:  row.get(1)?,
      name:       row.get(2)?,
      species:    row.get(3)?,
      breed:      row.get(4)?,
      age:        row.get(5)?,
      sex:        row.get(6)?,
      weight_kg:  row.get(7)?,
      created_at: row.get(8)?,
    })
  }

  pub fn into_pet(self) -> Result<Pet> {
    Ok(Pet {
      pet_id:     decode_uuid(&self.pet_id)?,
      client_id:  decode_uuid(&self.client_id)?,
      name:       self.name,
      species:    self.species,
      breed:      self.breed,
      age:        self.age,
      sex:        self.sex,
      weight_kg:  self.weight_kg,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const VETERINARIAN_COLUMNS: &str =
  "veterinarian_id, name, specialty, phone, email, active, created_at";

pub struct RawVeterinarian {
  pub veterinarian_id: String,
  pub name:            String,
  pub specialty:       Option<String>,
  pub phone:           Option<String>,
  pub email:           Option<String>,
  pub active:          bool,
  pub created_at:      String,
}

impl RawVeterinarian {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      veterinarian_id: row.get(0)?,
      name:            row.get(1)?,
      specialty:       row.get(2)?,
      phone:           row.get(3)?,
      email:           row.get(4)?,
      active:          row.get(5)?,
      created_at:      row.get(6)?,
    })
  }

  pub fn into_veterinarian(self) -> Result<Veterinarian> {
    Ok(Veterinarian {
      veterinarian_id: decode_uuid(&self.veterinarian_id)?,
      name:            self.name,
      specialty:       self.specialty,
      phone:           self.phone,
      email:           self.email,
      active:          self.active,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

pub const SHIFT_COLUMNS: &str =
  "shift_id, veterinarian_id, weekday, start_time, end_time";

pub struct RawShift {
  pub shift_id:        String,
  pub veterinarian_id: String,
  pub weekday:         i64,
  pub start:           String,
  pub end:             String,
}

impl RawShift {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      shift_id:        row.get(0)?,
      veterinarian_id: row.get(1)?,
      weekday:         row.get(2)?,
      start:           row.get(3)?,
      end:             row.get(4)?,
    })
  }

  pub fn into_shift(self) -> Result<Shift> {
    Ok(Shift {
      shift_id:        decode_uuid(&self.shift_id)?,
      veterinarian_id: decode_uuid(&self.veterinarian_id)?,
      weekday:         decode_weekday(self.weekday)?,
      start:           decode_time(&self.start)?,
      end:             decode_time(&self.end)?,
    })
  }
}

pub const APPOINTMENT_COLUMNS: &str = "appointment_id, date, time, reason, status, \
   pet_id, client_id, veterinarian_id, observations, created_at, updated_at";

pub struct RawAppointment {
  pub appointment_id:  String,
  pub date:            String,
  pub time:            String,
  pub reason:          String,
  pub status:          String,
  pub pet_id:          String,
  pub client_id:       String,
  pub veterinarian_id: Option<String>,
  pub observations:    String,
  pub created_at:      String,
  pub updated_at:      Option<String>,
}

impl RawAppointment {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      appointment_id:  row.get(0)?,
      date:            row.get(1)?,
      time:            row.get(2)?,
      reason:          row.get(3)?,
      status:          row.get(4)?,
      pet_id:          row.get(5)?,
      client_id:       row.get(6)?,
      veterinarian_id: row.get(7)?,
      observations:    row.get(8)?,
      created_at:      row.get(9)?,
      updated_at:      row.get(10)?,
    })
  }

  pub fn into_appointment(self) -> Result<Appointment> {
    Ok(Appointment {
      appointment_id:  decode_uuid(&self.appointment_id)?,
      date:            decode_date(&self.date)?,
      time:            decode_time(&self.time)?,
      reason:          self.reason,
      status:          decode_status(&self.status)?,
      pet_id:          decode_uuid(&self.pet_id)?,
      client_id:       decode_uuid(&self.client_id)?,
      veterinarian_id: self
        .veterinarian_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      observations:    self.observations,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

pub const TREATMENT_COLUMNS: &str = "t.treatment_id, t.appointment_id, t.diagnosis, \
   t.indicated_treatment, t.recommendations, t.created_at";

/// A `treatments` row plus its `medications` rows, in position order.
pub struct RawTreatment {
  pub treatment_id:        String,
  pub appointment_id:      String,
  pub diagnosis:           String,
  pub indicated_treatment: String,
  pub recommendations:     String,
  pub created_at:          String,
  pub medications:         Vec<Medication>,
}

impl RawTreatment {
  /// Reads the treatment columns; `medications` is filled in separately.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      treatment_id:        row.get(0)?,
      appointment_id:      row.get(1)?,
      diagnosis:           row.get(2)?,
      indicated_treatment: row.get(3)?,
      recommendations:     row.get(4)?,
      created_at:          row.get(5)?,
      medications:         Vec::new(),
    })
  }

  pub fn into_treatment(self) -> Result<Treatment> {
    Ok(Treatment {
      treatment_id:        decode_uuid(&self.treatment_id)?,
      appointment_id:      decode_uuid(&self.appointment_id)?,
      diagnosis:           self.diagnosis,
      indicated_treatment: self.indicated_treatment,
      recommendations:     self.recommendations,
      medications:         self.medications,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

pub fn medication_from_row(row: &Row<'_>) -> rusqlite::Result<Medication> {
  Ok(Medication {
    name:     row.get(0)?,
    dosage:   row.get(1)?,
    duration: row.get(2)?,
  })
}
