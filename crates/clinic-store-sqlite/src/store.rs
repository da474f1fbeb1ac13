//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use clinic_core::{
  appointment::{Appointment, AppointmentFilter, NewAppointment},
  records::{Client, Medication, NewClient, NewPet, NewTreatment, Pet, Treatment},
  staff::{NewShift, NewVeterinarian, Shift, Veterinarian},
  store::RecordStore,
};

use crate::{
  encode::{
    encode_date, encode_dt, encode_status, encode_time, encode_uuid,
    encode_weekday, medication_from_row, RawAppointment, RawClient, RawPet,
    RawShift, RawTreatment, RawVeterinarian, APPOINTMENT_COLUMNS,
    CLIENT_COLUMNS, PET_COLUMNS, SHIFT_COLUMNS, TREATMENT_COLUMNS,
    VETERINARIAN_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Fill in `raw.medications` from the `medications` table.
fn load_medications(
  conn: &rusqlite::Connection,
  raw: &mut RawTreatment,
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare_cached(
    "SELECT name, dosage, duration FROM medications
     WHERE treatment_id = ?1 ORDER BY position",
  )?;
  raw.medications = stmt
    .query_map(rusqlite::params![raw.treatment_id], medication_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(())
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A clinic record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Clients & pets ────────────────────────────────────────────────────────

  async fn insert_client(&self, input: NewClient) -> Result<Client> {
    let client = Client {
      client_id:  Uuid::new_v4(),
      name:       input.name,
      phone:      input.phone,
      email:      input.email,
      address:    input.address,
      created_at: Utc::now(),
    };

    let id_str = encode_uuid(client.client_id);
    let at_str = encode_dt(client.created_at);
    let row = client.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO clients (client_id, name, phone, email, address, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, row.name, row.phone, row.email, row.address, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(client)
  }

  async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawClient> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE client_id = ?1"),
            rusqlite::params![id_str],
            RawClient::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawClient::into_client).transpose()
  }

  async fn insert_pet(&self, input: NewPet) -> Result<Pet> {
    let pet = Pet {
      pet_id:     Uuid::new_v4(),
      client_id:  input.client_id,
      name:       input.name,
      species:    input.species,
      breed:      input.breed,
      age:        input.age,
      sex:        input.sex,
      weight_kg:  input.weight_kg,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(pet.pet_id);
    let client_str = encode_uuid(pet.client_id);
    let at_str     = encode_dt(pet.created_at);
    let row        = pet.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pets (
             pet_id, client_id, name, species, breed, age, sex, weight_kg, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            client_str,
            row.name,
            row.species,
            row.breed,
            row.age,
            row.sex,
            row.weight_kg,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(pet)
  }

  async fn get_pet(&self, id: Uuid) -> Result<Option<Pet>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPet> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PET_COLUMNS} FROM pets WHERE pet_id = ?1"),
            rusqlite::params![id_str],
            RawPet::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPet::into_pet).transpose()
  }

  async fn list_pets(&self, owner: Option<Uuid>) -> Result<Vec<Pet>> {
    let owner_str = owner.map(encode_uuid);

    let raws: Vec<RawPet> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PET_COLUMNS} FROM pets
           WHERE (?1 IS NULL OR client_id = ?1)
           ORDER BY name, created_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawPet::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPet::into_pet).collect()
  }

  // ── Veterinarians ─────────────────────────────────────────────────────────

  async fn insert_veterinarian(&self, input: NewVeterinarian) -> Result<Veterinarian> {
    let vet = Veterinarian {
      veterinarian_id: Uuid::new_v4(),
      name:            input.name,
      specialty:       input.specialty,
      phone:           input.phone,
      email:           input.email,
      active:          input.active,
      created_at:      Utc::now(),
    };

    let id_str = encode_uuid(vet.veterinarian_id);
    let at_str = encode_dt(vet.created_at);
    let row    = vet.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO veterinarians (
             veterinarian_id, name, specialty, phone, email, active, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            row.name,
            row.specialty,
            row.phone,
            row.email,
            row.active,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(vet)
  }

  async fn get_veterinarian(&self, id: Uuid) -> Result<Option<Veterinarian>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawVeterinarian> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {VETERINARIAN_COLUMNS} FROM veterinarians WHERE veterinarian_id = ?1"
            ),
            rusqlite::params![id_str],
            RawVeterinarian::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVeterinarian::into_veterinarian).transpose()
  }

  async fn list_veterinarians(&self) -> Result<Vec<Veterinarian>> {
    let raws: Vec<RawVeterinarian> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VETERINARIAN_COLUMNS} FROM veterinarians ORDER BY name, created_at"
        ))?;
        let rows = stmt
          .query_map([], RawVeterinarian::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVeterinarian::into_veterinarian).collect()
  }

  async fn update_veterinarian(&self, vet: Veterinarian) -> Result<Option<Veterinarian>> {
    let id_str = encode_uuid(vet.veterinarian_id);
    let row    = vet.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE veterinarians
           SET name = ?2, specialty = ?3, phone = ?4, email = ?5, active = ?6
           WHERE veterinarian_id = ?1",
          rusqlite::params![id_str, row.name, row.specialty, row.phone, row.email, row.active],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(vet))
  }

  // ── Shifts ────────────────────────────────────────────────────────────────

  async fn insert_shift(&self, input: NewShift) -> Result<Shift> {
    let shift = Shift {
      shift_id:        Uuid::new_v4(),
      veterinarian_id: input.veterinarian_id,
      weekday:         input.window.weekday,
      start:           input.window.start,
      end:             input.window.end,
    };

    let id_str    = encode_uuid(shift.shift_id);
    let vet_str   = encode_uuid(shift.veterinarian_id);
    let weekday   = encode_weekday(shift.weekday);
    let start_str = encode_time(shift.start);
    let end_str   = encode_time(shift.end);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO shifts (shift_id, veterinarian_id, weekday, start_time, end_time)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, vet_str, weekday, start_str, end_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(shift)
  }

  async fn get_shift(&self, id: Uuid) -> Result<Option<Shift>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawShift> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE shift_id = ?1"),
            rusqlite::params![id_str],
            RawShift::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawShift::into_shift).transpose()
  }

  async fn list_shifts(&self, veterinarian_id: Option<Uuid>) -> Result<Vec<Shift>> {
    let vet_str = veterinarian_id.map(encode_uuid);

    let raws: Vec<RawShift> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SHIFT_COLUMNS} FROM shifts
           WHERE (?1 IS NULL OR veterinarian_id = ?1)
           ORDER BY weekday, start_time"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![vet_str], RawShift::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawShift::into_shift).collect()
  }

  async fn update_shift(&self, shift: Shift) -> Result<Option<Shift>> {
    let id_str    = encode_uuid(shift.shift_id);
    let vet_str   = encode_uuid(shift.veterinarian_id);
    let weekday   = encode_weekday(shift.weekday);
    let start_str = encode_time(shift.start);
    let end_str   = encode_time(shift.end);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE shifts
           SET veterinarian_id = ?2, weekday = ?3, start_time = ?4, end_time = ?5
           WHERE shift_id = ?1",
          rusqlite::params![id_str, vet_str, weekday, start_str, end_str],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(shift))
  }

  async fn delete_shift(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM shifts WHERE shift_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Appointments ──────────────────────────────────────────────────────────

  async fn insert_appointment(&self, input: NewAppointment) -> Result<Appointment> {
    let appointment = Appointment {
      appointment_id:  Uuid::new_v4(),
      date:            input.date,
      time:            input.time,
      reason:          input.reason,
      status:          input.status,
      pet_id:          input.pet_id,
      client_id:       input.client_id,
      veterinarian_id: input.veterinarian_id,
      observations:    input.observations,
      created_at:      Utc::now(),
      updated_at:      None,
    };

    let id_str     = encode_uuid(appointment.appointment_id);
    let date_str   = encode_date(appointment.date);
    let time_str   = encode_time(appointment.time);
    let status_str = encode_status(appointment.status);
    let pet_str    = encode_uuid(appointment.pet_id);
    let client_str = encode_uuid(appointment.client_id);
    let vet_str    = appointment.veterinarian_id.map(encode_uuid);
    let at_str     = encode_dt(appointment.created_at);
    let reason     = appointment.reason.clone();
    let notes      = appointment.observations.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO appointments (
             appointment_id, date, time, reason, status,
             pet_id, client_id, veterinarian_id, observations, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str,
            date_str,
            time_str,
            reason,
            status_str,
            pet_str,
            client_str,
            vet_str,
            notes,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(appointment)
  }

  async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawAppointment> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE appointment_id = ?1"
            ),
            rusqlite::params![id_str],
            RawAppointment::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAppointment::into_appointment).transpose()
  }

  async fn list_appointments(&self, filter: AppointmentFilter) -> Result<Vec<Appointment>> {
    let status_str = filter.status.map(encode_status);
    let pet_str    = filter.pet_id.map(encode_uuid);
    let client_str = filter.client_id.map(encode_uuid);
    let vet_str    = filter.veterinarian_id.map(encode_uuid);
    let date_str   = filter.date.map(encode_date);
    let from_str   = filter.from.map(encode_date);
    let to_str     = filter.to.map(encode_date);

    let raws: Vec<RawAppointment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {APPOINTMENT_COLUMNS} FROM appointments
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR pet_id = ?2)
             AND (?3 IS NULL OR client_id = ?3)
             AND (?4 IS NULL OR veterinarian_id = ?4)
             AND (?5 IS NULL OR date = ?5)
             AND (?6 IS NULL OR date >= ?6)
             AND (?7 IS NULL OR date <= ?7)
           ORDER BY date, time, created_at"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              status_str, pet_str, client_str, vet_str, date_str, from_str, to_str,
            ],
            RawAppointment::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAppointment::into_appointment).collect()
  }

  async fn update_appointment(&self, appointment: Appointment) -> Result<Option<Appointment>> {
    let updated = Appointment { updated_at: Some(Utc::now()), ..appointment };

    let id_str     = encode_uuid(updated.appointment_id);
    let date_str   = encode_date(updated.date);
    let time_str   = encode_time(updated.time);
    let status_str = encode_status(updated.status);
    let vet_str    = updated.veterinarian_id.map(encode_uuid);
    let at_str     = updated.updated_at.map(encode_dt);
    let reason     = updated.reason.clone();
    let notes      = updated.observations.clone();

    // pet, client and created_at are fixed at booking time.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE appointments
           SET date = ?2, time = ?3, reason = ?4, status = ?5,
               veterinarian_id = ?6, observations = ?7, updated_at = ?8
           WHERE appointment_id = ?1",
          rusqlite::params![
            id_str, date_str, time_str, reason, status_str, vet_str, notes, at_str,
          ],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(updated))
  }

  async fn delete_appointment(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM medications WHERE treatment_id IN
             (SELECT treatment_id FROM treatments WHERE appointment_id = ?1)",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM treatments WHERE appointment_id = ?1",
          rusqlite::params![id_str],
        )?;
        let changed = tx.execute(
          "DELETE FROM appointments WHERE appointment_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(changed)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Treatments ────────────────────────────────────────────────────────────

  async fn insert_treatment(&self, input: NewTreatment) -> Result<Treatment> {
    let treatment = Treatment {
      treatment_id:        Uuid::new_v4(),
      appointment_id:      input.appointment_id,
      diagnosis:           input.diagnosis,
      indicated_treatment: input.indicated_treatment,
      recommendations:     input.recommendations,
      medications:         input.medications,
      created_at:          Utc::now(),
    };

    let id_str   = encode_uuid(treatment.treatment_id);
    let appt_str = encode_uuid(treatment.appointment_id);
    let at_str   = encode_dt(treatment.created_at);
    let row      = treatment.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO treatments (
             treatment_id, appointment_id, diagnosis,
             indicated_treatment, recommendations, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            appt_str,
            row.diagnosis,
            row.indicated_treatment,
            row.recommendations,
            at_str,
          ],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO medications (treatment_id, position, name, dosage, duration)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (position, Medication { name, dosage, duration }) in
            row.medications.iter().enumerate()
          {
            stmt.execute(rusqlite::params![id_str, position as i64, name, dosage, duration])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(treatment)
  }

  async fn get_treatment_for_appointment(
    &self,
    appointment_id: Uuid,
  ) -> Result<Option<Treatment>> {
    let appt_str = encode_uuid(appointment_id);

    let raw: Option<RawTreatment> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!(
              "SELECT {TREATMENT_COLUMNS} FROM treatments t WHERE t.appointment_id = ?1"
            ),
            rusqlite::params![appt_str],
            RawTreatment::from_row,
          )
          .optional()?;
        let Some(mut raw) = raw else {
          return Ok(None);
        };
        load_medications(conn, &mut raw)?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawTreatment::into_treatment).transpose()
  }

  async fn list_treatments_for_pet(&self, pet_id: Uuid) -> Result<Vec<Treatment>> {
    let pet_str = encode_uuid(pet_id);

    let raws: Vec<RawTreatment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TREATMENT_COLUMNS} FROM treatments t
           JOIN appointments a ON a.appointment_id = t.appointment_id
           WHERE a.pet_id = ?1
           ORDER BY a.date, a.time"
        ))?;
        let mut rows = stmt
          .query_map(rusqlite::params![pet_str], RawTreatment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        for raw in &mut rows {
          load_medications(conn, raw)?;
        }
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTreatment::into_treatment).collect()
  }
}
