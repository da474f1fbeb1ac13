//! The scheduling engine: every booking rule, applied over a [`RecordStore`].
//!
//! The pure modules ([`slots`], [`availability`], [`conflict`], [`history`],
//! [`agenda`]) do the computation. `Scheduler` loads what they need from the
//! store, runs the checks in a fixed order, and writes only once every check
//! has passed.

use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  agenda::{self, MonthAgenda, Summary},
  appointment::{
    Appointment, AppointmentDraft, AppointmentFilter, AppointmentPatch,
    NewAppointment,
  },
  availability,
  conflict::{self, SlotRequest},
  error::{Error, Resource, Result, ValidationError},
  history::{self, HistoryOrder, Visit},
  lifecycle::AppointmentStatus,
  policy::{ConflictScope, SchedulingPolicy},
  records::{Client, NewClient, NewPet, NewTreatment, Pet, Treatment},
  slots,
  staff::{
    NewShift, NewVeterinarian, Shift, ShiftWindow, Veterinarian,
    VeterinarianPatch,
  },
  store::RecordStore,
};

fn require_text(value: &str, field: &'static str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::MissingField(field));
  }
  Ok(())
}

fn require_slot(time: NaiveTime) -> Result<(), ValidationError> {
  if !slots::is_slot(time) {
    return Err(ValidationError::OffGridTime(time));
  }
  Ok(())
}

fn check_window(window: &ShiftWindow) -> Result<(), ValidationError> {
  if window.start >= window.end {
    return Err(ValidationError::InvalidShiftWindow {
      start: window.start,
      end:   window.end,
    });
  }
  Ok(())
}

/// Answers "what day is it" for the past-date check.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

fn local_today() -> NaiveDate { Local::now().date_naive() }

/// The engine. Cheap to clone; every clone shares the same store.
pub struct Scheduler<S> {
  store:  Arc<S>,
  policy: SchedulingPolicy,
  clock:  Clock,
}

impl<S> Clone for Scheduler<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      policy: self.policy.clone(),
      clock:  Arc::clone(&self.clock),
    }
  }
}

impl<S: RecordStore> Scheduler<S> {
  /// A scheduler whose "today" is the local date.
  pub fn new(store: Arc<S>, policy: SchedulingPolicy) -> Self {
    Self { store, policy, clock: Arc::new(local_today) }
  }

  /// Replace the clock, e.g. to pin "today" in tests.
  pub fn with_clock(
    mut self,
    clock: impl Fn() -> NaiveDate + Send + Sync + 'static,
  ) -> Self {
    self.clock = Arc::new(clock);
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn policy(&self) -> &SchedulingPolicy { &self.policy }

  pub fn today(&self) -> NaiveDate { (self.clock)() }

  fn check_not_past(&self, date: NaiveDate) -> Result<(), ValidationError> {
    if !self.policy.reject_past_dates {
      return Ok(());
    }
    let today = self.today();
    if date < today {
      return Err(ValidationError::DateInPast { date, today });
    }
    Ok(())
  }

  // ─── Slots & availability ─────────────────────────────────────────────────

  pub fn generate_slots(&self) -> Vec<NaiveTime> { slots::generate_slots() }

  /// Veterinarians who can take `date` at `time`, ordered by name.
  pub async fn resolve_available_veterinarians(
    &self,
    date: NaiveDate,
    time: Option<NaiveTime>,
  ) -> Result<Vec<Veterinarian>> {
    if time.is_none() {
      return Ok(Vec::new());
    }
    let vets = self.store.list_veterinarians().await.map_err(Error::store)?;
    let shifts = self.store.list_shifts(None).await.map_err(Error::store)?;

    let available: Vec<Veterinarian> =
      availability::resolve(&vets, &shifts, date.weekday(), time)
        .into_iter()
        .cloned()
        .collect();
    debug!(%date, ?time, count = available.len(), "resolved available veterinarians");
    Ok(available)
  }

  /// Whether booking `request` would double-book the slot.
  pub async fn has_conflict(&self, request: SlotRequest) -> Result<bool> {
    Ok(self.find_conflict(&request).await?.is_some())
  }

  async fn find_conflict(&self, request: &SlotRequest) -> Result<Option<Appointment>> {
    let same_day = self
      .store
      .list_appointments(AppointmentFilter::on(request.date))
      .await
      .map_err(Error::store)?;
    let hit =
      conflict::find_conflict(&same_day, request, self.policy.conflict_scope).cloned();
    debug!(
      date = %request.date,
      time = %request.time,
      conflict = ?hit.as_ref().map(|a| a.appointment_id),
      "conflict check"
    );
    Ok(hit)
  }

  /// Fails with `SlotUnavailable` if `request` collides with an open booking.
  async fn claim_slot(&self, request: SlotRequest) -> Result<()> {
    if let Some(existing) = self.find_conflict(&request).await? {
      warn!(
        date = %request.date,
        time = %request.time,
        existing = %existing.appointment_id,
        "slot already taken"
      );
      return Err(Error::SlotUnavailable { date: request.date, time: request.time });
    }
    Ok(())
  }

  /// The veterinarian must exist; with shift coverage enforced, they must
  /// also be active and on shift at `date` `time`.
  async fn check_veterinarian(
    &self,
    veterinarian_id: Uuid,
    date: NaiveDate,
    time: NaiveTime,
  ) -> Result<()> {
    let vet = self.get_veterinarian(veterinarian_id).await?;
    if !self.policy.enforce_shift_coverage {
      return Ok(());
    }

    let shifts = self
      .store
      .list_shifts(Some(veterinarian_id))
      .await
      .map_err(Error::store)?;
    if !availability::is_eligible(&vet, &shifts, date.weekday(), time) {
      warn!(%veterinarian_id, %date, %time, "veterinarian not on shift");
      return Err(
        ValidationError::VeterinarianUnavailable { veterinarian_id, date, time }
          .into(),
      );
    }
    Ok(())
  }

  /// Slots on `date` that a new booking could still take. With a
  /// veterinarian, only the slots inside that veterinarian's shifts.
  pub async fn free_slots(
    &self,
    date: NaiveDate,
    veterinarian_id: Option<Uuid>,
  ) -> Result<Vec<NaiveTime>> {
    let coverage = match veterinarian_id {
      Some(id) => {
        let vet = self.get_veterinarian(id).await?;
        let shifts = self.store.list_shifts(Some(id)).await.map_err(Error::store)?;
        Some((vet, shifts))
      }
      None => None,
    };
    let same_day = self
      .store
      .list_appointments(AppointmentFilter::on(date))
      .await
      .map_err(Error::store)?;

    let weekday = date.weekday();
    Ok(conflict::free_slots(
      &same_day,
      date,
      veterinarian_id,
      self.policy.conflict_scope,
      |time| {
        coverage.as_ref().is_none_or(|(vet, shifts)| {
          availability::is_eligible(vet, shifts, weekday, time)
        })
      },
    ))
  }

  // ─── Appointment lifecycle ────────────────────────────────────────────────

  pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment> {
    self
      .store
      .get_appointment(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(Resource::Appointment, id))
  }

  pub async fn list_appointments(
    &self,
    filter: AppointmentFilter,
  ) -> Result<Vec<Appointment>> {
    self.store.list_appointments(filter).await.map_err(Error::store)
  }

  /// Book a new appointment in `Pending`.
  ///
  /// Checks run in this order and the first failure wins: required fields
  /// and the date not being in the past, the pet, the pet's owner, the veterinarian requirement, veterinarian
  /// eligibility, then the slot itself. Nothing is written on failure.
  pub async fn create_appointment(&self, draft: AppointmentDraft) -> Result<Appointment> {
    let date = draft.date.ok_or(ValidationError::MissingField("date"))?;
    let time = draft.time.ok_or(ValidationError::MissingField("time"))?;
    require_slot(time)?;
    require_text(&draft.reason, "reason")?;
    let pet_id = draft.pet_id.ok_or(ValidationError::MissingField("pet_id"))?;
    let client_id = draft.client_id.ok_or(ValidationError::MissingField("client_id"))?;
    self.check_not_past(date)?;

    let pet = self.get_pet(pet_id).await?;
    if pet.client_id != client_id {
      return Err(ValidationError::ClientMismatch { client_id, pet_id }.into());
    }

    if self.policy.require_veterinarian && draft.veterinarian_id.is_none() {
      return Err(ValidationError::MissingField("veterinarian_id").into());
    }
    if let Some(vet_id) = draft.veterinarian_id {
      self.check_veterinarian(vet_id, date, time).await?;
    }

    self
      .claim_slot(SlotRequest {
        date,
        time,
        veterinarian_id: draft.veterinarian_id,
        exclude: None,
      })
      .await?;

    let appointment = self
      .store
      .insert_appointment(NewAppointment {
        date,
        time,
        reason: draft.reason.trim().to_owned(),
        status: AppointmentStatus::Pending,
        pet_id,
        client_id,
        veterinarian_id: draft.veterinarian_id,
        observations: draft.observations,
      })
      .await
      .map_err(Error::store)?;

    info!(
      id = %appointment.appointment_id,
      %date,
      %time,
      pet = %pet_id,
      "appointment booked"
    );
    Ok(appointment)
  }

  /// Edit an appointment's details. Status is changed only through
  /// [`Self::change_status`].
  ///
  /// Moving to another day or time re-checks the slot (ignoring the
  /// appointment itself) and the veterinarian's shift. A new veterinarian is
  /// re-checked for eligibility, and also for the slot when slots are locked
  /// per veterinarian. A patch `veterinarian_id` of `null` unassigns.
  ///
  /// Completed and cancelled appointments hold no slot, so editing them skips
  /// the slot, shift and past-date checks.
  pub async fn update_appointment(
    &self,
    id: Uuid,
    patch: AppointmentPatch,
  ) -> Result<Appointment> {
    let current = self.get_appointment(id).await?;

    let mut next = current.clone();
    if let Some(date) = patch.date {
      next.date = date;
    }
    if let Some(time) = patch.time {
      require_slot(time)?;
      next.time = time;
    }
    if let Some(reason) = patch.reason {
      require_text(&reason, "reason")?;
      next.reason = reason.trim().to_owned();
    }
    if let Some(vet_id) = patch.veterinarian_id {
      next.veterinarian_id = vet_id;
    }
    if let Some(observations) = patch.observations {
      next.observations = observations;
    }

    if next == current {
      debug!(%id, "update is a no-op");
      return Ok(current);
    }

    let moved = next.date != current.date || next.time != current.time;
    let reassigned = next.veterinarian_id != current.veterinarian_id;
    let open = next.status.holds_slot();

    if open && next.date != current.date {
      self.check_not_past(next.date)?;
    }
    if open
      && reassigned
      && self.policy.require_veterinarian
      && next.veterinarian_id.is_none()
    {
      return Err(ValidationError::MissingField("veterinarian_id").into());
    }
    if open
      && (moved || reassigned)
      && let Some(vet_id) = next.veterinarian_id
    {
      self.check_veterinarian(vet_id, next.date, next.time).await?;
    }

    let recheck_slot = moved
      || (reassigned && self.policy.conflict_scope == ConflictScope::Veterinarian);
    if recheck_slot && open {
      self
        .claim_slot(SlotRequest {
          date:            next.date,
          time:            next.time,
          veterinarian_id: next.veterinarian_id,
          exclude:         Some(id),
        })
        .await?;
    }

    let updated = self
      .store
      .update_appointment(next)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(Resource::Appointment, id))?;
    info!(%id, moved, reassigned, "appointment updated");
    Ok(updated)
  }

  /// Move an appointment along the status machine. The slot is not
  /// re-checked: an appointment that already holds it keeps it.
  pub async fn change_status(
    &self,
    id: Uuid,
    to: AppointmentStatus,
  ) -> Result<Appointment> {
    let mut appointment = self.get_appointment(id).await?;
    let from = appointment.status;

    if !from.can_transition_to(to) {
      warn!(%id, %from, %to, "illegal status transition");
      return Err(Error::InvalidTransition { from, to });
    }

    appointment.status = to;
    let updated = self
      .store
      .update_appointment(appointment)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(Resource::Appointment, id))?;
    info!(%id, %from, %to, "appointment status changed");
    Ok(updated)
  }

  pub async fn cancel_appointment(&self, id: Uuid) -> Result<Appointment> {
    self.change_status(id, AppointmentStatus::Cancelled).await
  }

  /// Remove an appointment and its treatment outright. Administrative
  /// clean-up only; normal cancellation goes through the status machine.
  pub async fn purge_appointment(&self, id: Uuid) -> Result<()> {
    let deleted = self.store.delete_appointment(id).await.map_err(Error::store)?;
    if !deleted {
      return Err(Error::not_found(Resource::Appointment, id));
    }
    info!(%id, "appointment purged");
    Ok(())
  }

  // ─── Views ────────────────────────────────────────────────────────────────

  /// Every appointment of `pet_id` with its treatment, if any. An unknown
  /// pet simply has no history.
  pub async fn get_pet_history(
    &self,
    pet_id: Uuid,
    order: HistoryOrder,
  ) -> Result<Vec<Visit>> {
    let appointments = self
      .store
      .list_appointments(AppointmentFilter::for_pet(pet_id))
      .await
      .map_err(Error::store)?;
    let treatments = self
      .store
      .list_treatments_for_pet(pet_id)
      .await
      .map_err(Error::store)?;
    Ok(history::aggregate(pet_id, appointments, treatments, order))
  }

  pub async fn month_agenda(&self, year: i32, month: u32) -> Result<MonthAgenda> {
    let invalid = || Error::from(ValidationError::InvalidMonth { year, month });
    let (start, end) = agenda::grid_bounds(year, month).ok_or_else(invalid)?;
    let appointments = self
      .store
      .list_appointments(AppointmentFilter::between(start, end))
      .await
      .map_err(Error::store)?;
    agenda::month_agenda(year, month, appointments).ok_or_else(invalid)
  }

  pub async fn summary(&self, today: NaiveDate) -> Result<Summary> {
    let all = self
      .store
      .list_appointments(AppointmentFilter::default())
      .await
      .map_err(Error::store)?;
    Ok(agenda::summarize(&all, today))
  }

  // ─── Veterinarians & shifts ───────────────────────────────────────────────

  pub async fn register_veterinarian(
    &self,
    input: NewVeterinarian,
  ) -> Result<Veterinarian> {
    require_text(&input.name, "name")?;
    let vet = self
      .store
      .insert_veterinarian(input)
      .await
      .map_err(Error::store)?;
    info!(id = %vet.veterinarian_id, name = %vet.name, "veterinarian registered");
    Ok(vet)
  }

  pub async fn get_veterinarian(&self, id: Uuid) -> Result<Veterinarian> {
    self
      .store
      .get_veterinarian(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(Resource::Veterinarian, id))
  }

  pub async fn list_veterinarians(&self) -> Result<Vec<Veterinarian>> {
    self.store.list_veterinarians().await.map_err(Error::store)
  }

  /// Edit a veterinarian, including the active flag. Deactivating keeps the
  /// veterinarian's shifts and appointments untouched.
  pub async fn update_veterinarian(
    &self,
    id: Uuid,
    patch: VeterinarianPatch,
  ) -> Result<Veterinarian> {
    let mut vet = self.get_veterinarian(id).await?;
    if let Some(name) = patch.name {
      require_text(&name, "name")?;
      vet.name = name;
    }
    if let Some(specialty) = patch.specialty {
      vet.specialty = Some(specialty);
    }
    if let Some(phone) = patch.phone {
      vet.phone = Some(phone);
    }
    if let Some(email) = patch.email {
      vet.email = Some(email);
    }
    if let Some(active) = patch.active {
      vet.active = active;
    }

    let updated = self
      .store
      .update_veterinarian(vet)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(Resource::Veterinarian, id))?;
    info!(%id, active = updated.active, "veterinarian updated");
    Ok(updated)
  }

  pub async fn add_shift(&self, veterinarian_id: Uuid, window: ShiftWindow) -> Result<Shift> {
    let window = window.whole_minutes();
    check_window(&window)?;
    self.get_veterinarian(veterinarian_id).await?;
    let shift = self
      .store
      .insert_shift(NewShift { veterinarian_id, window })
      .await
      .map_err(Error::store)?;
    info!(
      id = %shift.shift_id,
      veterinarian = %veterinarian_id,
      weekday = %shift.weekday,
      "shift added"
    );
    Ok(shift)
  }

  pub async fn update_shift(&self, id: Uuid, window: ShiftWindow) -> Result<Shift> {
    let window = window.whole_minutes();
    check_window(&window)?;
    let mut shift = self
      .store
      .get_shift(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(Resource::Shift, id))?;
    shift.weekday = window.weekday;
    shift.start = window.start;
    shift.end = window.end;

    self
      .store
      .update_shift(shift)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(Resource::Shift, id))
  }

  pub async fn remove_shift(&self, id: Uuid) -> Result<()> {
    if !self.store.delete_shift(id).await.map_err(Error::store)? {
      return Err(Error::not_found(Resource::Shift, id));
    }
    info!(%id, "shift removed");
    Ok(())
  }

  /// All shifts, or one veterinarian's (who must exist).
  pub async fn list_shifts(&self, veterinarian_id: Option<Uuid>) -> Result<Vec<Shift>> {
    if let Some(id) = veterinarian_id {
      self.get_veterinarian(id).await?;
    }
    self.store.list_shifts(veterinarian_id).await.map_err(Error::store)
  }

  // ─── Clients, pets & treatments ───────────────────────────────────────────

  pub async fn register_client(&self, input: NewClient) -> Result<Client> {
    require_text(&input.name, "name")?;
    self.store.insert_client(input).await.map_err(Error::store)
  }

  pub async fn get_client(&self, id: Uuid) -> Result<Client> {
    self
      .store
      .get_client(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(Resource::Client, id))
  }

  pub async fn register_pet(&self, input: NewPet) -> Result<Pet> {
    require_text(&input.name, "name")?;
    require_text(&input.species, "species")?;
    self.get_client(input.client_id).await?;
    self.store.insert_pet(input).await.map_err(Error::store)
  }

  pub async fn get_pet(&self, id: Uuid) -> Result<Pet> {
    self
      .store
      .get_pet(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::not_found(Resource::Pet, id))
  }

  pub async fn list_pets(&self, owner: Option<Uuid>) -> Result<Vec<Pet>> {
    self.store.list_pets(owner).await.map_err(Error::store)
  }

  /// Attach the clinical outcome to a confirmed or completed appointment.
  /// Medication lines without a name are dropped.
  pub async fn record_treatment(&self, mut input: NewTreatment) -> Result<Treatment> {
    require_text(&input.diagnosis, "diagnosis")?;
    let appointment = self.get_appointment(input.appointment_id).await?;
    if !matches!(
      appointment.status,
      AppointmentStatus::Confirmed | AppointmentStatus::Completed
    ) {
      return Err(
        ValidationError::AppointmentNotTreatable(
          appointment.appointment_id,
          appointment.status,
        )
        .into(),
      );
    }

    let existing = self
      .store
      .get_treatment_for_appointment(input.appointment_id)
      .await
      .map_err(Error::store)?;
    if existing.is_some() {
      return Err(ValidationError::TreatmentExists(input.appointment_id).into());
    }

    input.medications.retain(|m| !m.name.trim().is_empty());
    let treatment = self
      .store
      .insert_treatment(input)
      .await
      .map_err(Error::store)?;
    info!(
      id = %treatment.treatment_id,
      appointment = %treatment.appointment_id,
      medications = treatment.medications.len(),
      "treatment recorded"
    );
    Ok(treatment)
  }
}
