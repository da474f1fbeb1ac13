//! Integration tests for `SqliteStore` against an in-memory database, and for
//! the `Scheduler` running on top of it.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Weekday};
use clinic_core::{
  appointment::{AppointmentDraft, AppointmentFilter, AppointmentPatch, NewAppointment},
  conflict::SlotRequest,
  history::HistoryOrder,
  lifecycle::AppointmentStatus,
  policy::{ConflictScope, SchedulingPolicy},
  records::{Client, Medication, NewClient, NewPet, NewTreatment, Pet},
  staff::{NewShift, NewVeterinarian, ShiftWindow, Veterinarian, VeterinarianPatch},
  store::RecordStore,
  Error, Resource, Scheduler, ValidationError,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// "Today" for every scheduler under test: Saturday 2025-03-01, so the
/// Monday and Tuesday below are bookable.
fn opening_day() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 3, 1).unwrap() }

async fn scheduler_with(policy: SchedulingPolicy) -> Scheduler<SqliteStore> {
  Scheduler::new(Arc::new(store().await), policy).with_clock(opening_day)
}

async fn scheduler() -> Scheduler<SqliteStore> {
  scheduler_with(SchedulingPolicy::default()).await
}

fn t(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

/// 2025-03-03 is a Monday.
fn monday() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 3, 3).unwrap() }

fn tuesday() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 3, 4).unwrap() }

fn new_client(name: &str) -> NewClient {
  NewClient {
    name:    name.into(),
    phone:   Some("555-0100".into()),
    email:   None,
    address: None,
  }
}

fn new_pet(client_id: Uuid, name: &str) -> NewPet {
  NewPet {
    client_id,
    name: name.into(),
    species: "dog".into(),
    breed: Some("mixed".into()),
    age: Some(4),
    sex: Some("female".into()),
    weight_kg: Some(12.5),
  }
}

/// A client with one pet, registered through the store directly.
async fn owner_and_pet(s: &SqliteStore) -> (Client, Pet) {
  let client = s.insert_client(new_client("Marta")).await.unwrap();
  let pet = s.insert_pet(new_pet(client.client_id, "Luna")).await.unwrap();
  (client, pet)
}

fn draft(pet: &Pet, date: NaiveDate, time: NaiveTime) -> AppointmentDraft {
  AppointmentDraft {
    date: Some(date),
    time: Some(time),
    reason: "vaccination".into(),
    pet_id: Some(pet.pet_id),
    client_id: Some(pet.client_id),
    ..Default::default()
  }
}

async fn vet_with_shift(
  sched: &Scheduler<SqliteStore>,
  name: &str,
  weekday: Weekday,
  start: NaiveTime,
  end: NaiveTime,
) -> Veterinarian {
  let vet = sched
    .register_veterinarian(NewVeterinarian::new(name))
    .await
    .unwrap();
  sched
    .add_shift(vet.veterinarian_id, ShiftWindow { weekday, start, end })
    .await
    .unwrap();
  vet
}

// ─── Store: records ──────────────────────────────────────────────────────────

#[tokio::test]
async fn client_and_pet_round_trip() {
  let s = store().await;
  let (client, pet) = owner_and_pet(&s).await;

  let fetched = s.get_client(client.client_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Marta");
  assert_eq!(fetched.phone.as_deref(), Some("555-0100"));

  let fetched = s.get_pet(pet.pet_id).await.unwrap().unwrap();
  assert_eq!(fetched.client_id, client.client_id);
  assert_eq!(fetched.age, Some(4));
  assert_eq!(fetched.weight_kg, Some(12.5));

  assert!(s.get_pet(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_client(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_pets_filters_by_owner_and_sorts_by_name() {
  let s = store().await;
  let marta = s.insert_client(new_client("Marta")).await.unwrap();
  let jose = s.insert_client(new_client("José")).await.unwrap();
  s.insert_pet(new_pet(marta.client_id, "Toby")).await.unwrap();
  s.insert_pet(new_pet(marta.client_id, "Bimba")).await.unwrap();
  s.insert_pet(new_pet(jose.client_id, "Rex")).await.unwrap();

  let all = s.list_pets(None).await.unwrap();
  assert_eq!(all.len(), 3);

  let martas: Vec<_> = s
    .list_pets(Some(marta.client_id))
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.name)
    .collect();
  assert_eq!(martas, vec!["Bimba", "Toby"]);
}

// ─── Store: veterinarians & shifts ───────────────────────────────────────────

#[tokio::test]
async fn veterinarians_are_listed_by_name() {
  let s = store().await;
  s.insert_veterinarian(NewVeterinarian::new("Carla")).await.unwrap();
  s.insert_veterinarian(NewVeterinarian::new("Ana")).await.unwrap();

  let names: Vec<_> = s
    .list_veterinarians()
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.name)
    .collect();
  assert_eq!(names, vec!["Ana", "Carla"]);
}

#[tokio::test]
async fn update_veterinarian_missing_returns_none() {
  let s = store().await;
  let mut vet = s.insert_veterinarian(NewVeterinarian::new("Ana")).await.unwrap();
  vet.active = false;
  let updated = s.update_veterinarian(vet.clone()).await.unwrap().unwrap();
  assert!(!updated.active);
  assert!(!s.get_veterinarian(vet.veterinarian_id).await.unwrap().unwrap().active);

  vet.veterinarian_id = Uuid::new_v4();
  assert!(s.update_veterinarian(vet).await.unwrap().is_none());
}

#[tokio::test]
async fn shift_crud() {
  let s = store().await;
  let vet = s.insert_veterinarian(NewVeterinarian::new("Ana")).await.unwrap();
  let window = ShiftWindow { weekday: Weekday::Tue, start: t(8, 0), end: t(14, 0) };
  let shift = s
    .insert_shift(NewShift { veterinarian_id: vet.veterinarian_id, window })
    .await
    .unwrap();
  s.insert_shift(NewShift {
    veterinarian_id: vet.veterinarian_id,
    window:          ShiftWindow { weekday: Weekday::Mon, ..window },
  })
  .await
  .unwrap();

  let listed = s.list_shifts(Some(vet.veterinarian_id)).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].weekday, Weekday::Mon);
  assert_eq!(listed[1], shift);

  let mut moved = shift.clone();
  moved.end = t(18, 0);
  assert_eq!(s.update_shift(moved).await.unwrap().unwrap().end, t(18, 0));
  assert_eq!(s.get_shift(shift.shift_id).await.unwrap().unwrap().end, t(18, 0));

  assert!(s.delete_shift(shift.shift_id).await.unwrap());
  assert!(!s.delete_shift(shift.shift_id).await.unwrap());
  assert!(s.list_shifts(None).await.unwrap().len() == 1);
}

// ─── Store: appointments ─────────────────────────────────────────────────────

fn new_appointment(pet: &Pet, date: NaiveDate, time: NaiveTime) -> NewAppointment {
  NewAppointment {
    date,
    time,
    reason: "checkup".into(),
    status: AppointmentStatus::Pending,
    pet_id: pet.pet_id,
    client_id: pet.client_id,
    veterinarian_id: None,
    observations: String::new(),
  }
}

#[tokio::test]
async fn appointment_round_trip_and_update() {
  let s = store().await;
  let (_, pet) = owner_and_pet(&s).await;

  let appt = s
    .insert_appointment(new_appointment(&pet, tuesday(), t(10, 0)))
    .await
    .unwrap();
  assert!(appt.updated_at.is_none());

  let fetched = s.get_appointment(appt.appointment_id).await.unwrap().unwrap();
  assert_eq!(fetched.time, t(10, 0));
  assert_eq!(fetched.status, AppointmentStatus::Pending);

  let mut edited = fetched.clone();
  edited.status = AppointmentStatus::Confirmed;
  edited.observations = "bring vaccination card".into();
  let updated = s.update_appointment(edited).await.unwrap().unwrap();
  assert!(updated.updated_at.is_some());

  let fetched = s.get_appointment(appt.appointment_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, AppointmentStatus::Confirmed);
  assert_eq!(fetched.observations, "bring vaccination card");
  assert_eq!(fetched.created_at, appt.created_at);
}

#[tokio::test]
async fn list_appointments_applies_filter() {
  let s = store().await;
  let (_, pet) = owner_and_pet(&s).await;
  let other_owner = s.insert_client(new_client("José")).await.unwrap();
  let other_pet = s.insert_pet(new_pet(other_owner.client_id, "Rex")).await.unwrap();

  let a = s.insert_appointment(new_appointment(&pet, tuesday(), t(15, 0))).await.unwrap();
  let b = s.insert_appointment(new_appointment(&pet, tuesday(), t(9, 0))).await.unwrap();
  let mut c = new_appointment(&other_pet, monday(), t(9, 0));
  c.status = AppointmentStatus::Cancelled;
  let c = s.insert_appointment(c).await.unwrap();

  let all = s.list_appointments(AppointmentFilter::default()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|x| x.appointment_id).collect();
  assert_eq!(ids, vec![c.appointment_id, b.appointment_id, a.appointment_id]);

  let filters = [
    AppointmentFilter::on(tuesday()),
    AppointmentFilter::for_pet(other_pet.pet_id),
    AppointmentFilter { status: Some(AppointmentStatus::Cancelled), ..Default::default() },
    AppointmentFilter { client_id: Some(pet.client_id), ..Default::default() },
    AppointmentFilter::between(monday(), monday()),
  ];
  for filter in filters {
    let from_store = s.list_appointments(filter.clone()).await.unwrap();
    let in_memory: Vec<_> = all.iter().filter(|x| filter.matches(x)).cloned().collect();
    assert_eq!(from_store, in_memory, "{filter:?}");
  }
}

#[tokio::test]
async fn delete_appointment_takes_treatment_with_it() {
  let s = store().await;
  let (_, pet) = owner_and_pet(&s).await;
  let appt = s.insert_appointment(new_appointment(&pet, tuesday(), t(10, 0))).await.unwrap();
  s.insert_treatment(NewTreatment {
    appointment_id:      appt.appointment_id,
    diagnosis:           "otitis".into(),
    indicated_treatment: String::new(),
    recommendations:     String::new(),
    medications:         vec![],
  })
  .await
  .unwrap();

  assert!(s.delete_appointment(appt.appointment_id).await.unwrap());
  assert!(s.get_appointment(appt.appointment_id).await.unwrap().is_none());
  assert!(s.get_treatment_for_appointment(appt.appointment_id).await.unwrap().is_none());
  assert!(!s.delete_appointment(appt.appointment_id).await.unwrap());
}

#[tokio::test]
async fn treatment_keeps_medication_order() {
  let s = store().await;
  let (_, pet) = owner_and_pet(&s).await;
  let appt = s.insert_appointment(new_appointment(&pet, tuesday(), t(10, 0))).await.unwrap();

  let meds = vec![
    Medication { name: "Amoxicillin".into(), dosage: "250mg".into(), duration: "7 days".into() },
    Medication { name: "Meloxicam".into(), dosage: "1.5mg".into(), duration: "3 days".into() },
  ];
  let treatment = s
    .insert_treatment(NewTreatment {
      appointment_id:      appt.appointment_id,
      diagnosis:           "infection".into(),
      indicated_treatment: "antibiotics".into(),
      recommendations:     "rest".into(),
      medications:         meds.clone(),
    })
    .await
    .unwrap();

  let fetched = s
    .get_treatment_for_appointment(appt.appointment_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched, treatment);
  assert_eq!(fetched.medications, meds);

  let for_pet = s.list_treatments_for_pet(pet.pet_id).await.unwrap();
  assert_eq!(for_pet, vec![treatment]);
  assert!(s.list_treatments_for_pet(Uuid::new_v4()).await.unwrap().is_empty());
}

// ─── Scheduler: availability ─────────────────────────────────────────────────

#[tokio::test]
async fn shift_boundaries_are_inclusive() {
  let sched = scheduler().await;
  let vet = vet_with_shift(&sched, "Ana", Weekday::Mon, t(9, 0), t(12, 0)).await;

  for (time, expected) in [(t(9, 0), true), (t(12, 0), true), (t(12, 30), false)] {
    let got = sched
      .resolve_available_veterinarians(monday(), Some(time))
      .await
      .unwrap();
    assert_eq!(got.contains(&vet), expected, "{time}");
  }
  assert!(sched.resolve_available_veterinarians(monday(), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn deactivated_veterinarian_is_never_available_but_keeps_shifts() {
  let sched = scheduler().await;
  let vet = vet_with_shift(&sched, "Ana", Weekday::Tue, t(8, 0), t(19, 30)).await;

  let patch = VeterinarianPatch { active: Some(false), ..Default::default() };
  sched.update_veterinarian(vet.veterinarian_id, patch).await.unwrap();

  for slot in sched.generate_slots() {
    let got = sched
      .resolve_available_veterinarians(tuesday(), Some(slot))
      .await
      .unwrap();
    assert!(got.is_empty());
  }
  assert_eq!(sched.list_shifts(Some(vet.veterinarian_id)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn shift_window_must_start_before_it_ends() {
  let sched = scheduler().await;
  let vet = vet_with_shift(&sched, "Ana", Weekday::Tue, t(8, 0), t(14, 0)).await;
  let shift = sched.list_shifts(Some(vet.veterinarian_id)).await.unwrap().remove(0);

  let backwards = ShiftWindow { weekday: Weekday::Tue, start: t(14, 0), end: t(8, 0) };
  let err = sched.add_shift(vet.veterinarian_id, backwards).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::InvalidShiftWindow { .. })
  ));
  let err = sched.update_shift(shift.shift_id, backwards).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let err = sched
    .add_shift(Uuid::new_v4(), ShiftWindow { weekday: Weekday::Tue, start: t(8, 0), end: t(9, 0) })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { resource: Resource::Veterinarian, .. }));

  sched.remove_shift(shift.shift_id).await.unwrap();
  assert!(matches!(
    sched.remove_shift(shift.shift_id).await,
    Err(Error::NotFound { resource: Resource::Shift, .. })
  ));
}

#[tokio::test]
async fn shift_times_are_kept_to_the_minute() {
  let sched = scheduler().await;
  let vet = sched
    .register_veterinarian(NewVeterinarian::new("Ana"))
    .await
    .unwrap();
  let hms = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();

  let window = ShiftWindow { weekday: Weekday::Mon, start: hms(9, 0, 30), end: hms(12, 0, 30) };
  let added = sched.add_shift(vet.veterinarian_id, window).await.unwrap();
  assert_eq!((added.start, added.end), (t(9, 0), t(12, 0)));
  let listed = sched.list_shifts(Some(vet.veterinarian_id)).await.unwrap();
  assert_eq!(listed, vec![added.clone()]);

  // Distinct only in seconds: empty once stored to the minute.
  let window = ShiftWindow { weekday: Weekday::Mon, start: hms(9, 0, 10), end: hms(9, 0, 50) };
  let err = sched.add_shift(vet.veterinarian_id, window).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::InvalidShiftWindow { .. })
  ));
  let err = sched.update_shift(added.shift_id, window).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert_eq!(sched.list_shifts(None).await.unwrap(), vec![added]);
}

// ─── Scheduler: booking ──────────────────────────────────────────────────────

#[tokio::test]
async fn booking_scenario() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let ana = vet_with_shift(&sched, "Dr. Ana", Weekday::Tue, t(8, 0), t(14, 0)).await;

  assert_eq!(sched.generate_slots().len(), 24);

  let available = sched
    .resolve_available_veterinarians(tuesday(), Some(t(10, 0)))
    .await
    .unwrap();
  assert_eq!(available, vec![ana.clone()]);

  let first = sched
    .create_appointment(AppointmentDraft {
      veterinarian_id: Some(ana.veterinarian_id),
      ..draft(&pet, tuesday(), t(10, 0))
    })
    .await
    .unwrap();
  assert_eq!(first.status, AppointmentStatus::Pending);

  let err = sched
    .create_appointment(draft(&pet, tuesday(), t(10, 0)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SlotUnavailable { .. }));
  assert_eq!(
    sched.list_appointments(AppointmentFilter::on(tuesday())).await.unwrap().len(),
    1
  );

  sched
    .change_status(first.appointment_id, AppointmentStatus::Cancelled)
    .await
    .unwrap();
  assert!(!sched.has_conflict(SlotRequest::new(tuesday(), t(10, 0))).await.unwrap());

  let second = sched
    .create_appointment(draft(&pet, tuesday(), t(10, 0)))
    .await
    .unwrap();
  assert_eq!(second.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn create_validates_before_touching_the_store() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;

  let cases = [
    (AppointmentDraft { date: None, ..draft(&pet, tuesday(), t(10, 0)) }, "date"),
    (AppointmentDraft { time: None, ..draft(&pet, tuesday(), t(10, 0)) }, "time"),
    (AppointmentDraft { reason: "  ".into(), ..draft(&pet, tuesday(), t(10, 0)) }, "reason"),
    (AppointmentDraft { pet_id: None, ..draft(&pet, tuesday(), t(10, 0)) }, "pet_id"),
    (AppointmentDraft { client_id: None, ..draft(&pet, tuesday(), t(10, 0)) }, "client_id"),
  ];
  for (input, field) in cases {
    let err = sched.create_appointment(input).await.unwrap_err();
    assert!(
      matches!(err, Error::Validation(ValidationError::MissingField(f)) if f == field),
      "{field}: {err}"
    );
  }

  let err = sched
    .create_appointment(draft(&pet, tuesday(), t(10, 15)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(ValidationError::OffGridTime(_))));

  assert!(sched.list_appointments(AppointmentFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn create_checks_pet_and_owner() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;

  let err = sched
    .create_appointment(AppointmentDraft {
      pet_id: Some(Uuid::new_v4()),
      ..draft(&pet, tuesday(), t(10, 0))
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { resource: Resource::Pet, .. }));

  let err = sched
    .create_appointment(AppointmentDraft {
      client_id: Some(Uuid::new_v4()),
      ..draft(&pet, tuesday(), t(10, 0))
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(ValidationError::ClientMismatch { .. })));
}

#[tokio::test]
async fn named_veterinarian_must_be_on_shift() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let ana = vet_with_shift(&sched, "Ana", Weekday::Tue, t(8, 0), t(14, 0)).await;

  let err = sched
    .create_appointment(AppointmentDraft {
      veterinarian_id: Some(ana.veterinarian_id),
      ..draft(&pet, tuesday(), t(16, 0))
    })
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::VeterinarianUnavailable { .. })
  ));

  let err = sched
    .create_appointment(AppointmentDraft {
      veterinarian_id: Some(Uuid::new_v4()),
      ..draft(&pet, tuesday(), t(10, 0))
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { resource: Resource::Veterinarian, .. }));
}

#[tokio::test]
async fn policy_can_require_veterinarian_and_relax_coverage() {
  let sched = scheduler_with(SchedulingPolicy {
    require_veterinarian: true,
    enforce_shift_coverage: false,
    ..Default::default()
  })
  .await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let ana = sched
    .register_veterinarian(NewVeterinarian::new("Ana"))
    .await
    .unwrap();

  let err = sched
    .create_appointment(draft(&pet, tuesday(), t(10, 0)))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::MissingField("veterinarian_id"))
  ));

  // No shifts at all, but coverage is not enforced.
  sched
    .create_appointment(AppointmentDraft {
      veterinarian_id: Some(ana.veterinarian_id),
      ..draft(&pet, tuesday(), t(10, 0))
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn veterinarian_scope_allows_parallel_bookings() {
  let sched = scheduler_with(SchedulingPolicy {
    conflict_scope: ConflictScope::Veterinarian,
    ..Default::default()
  })
  .await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let ana = vet_with_shift(&sched, "Ana", Weekday::Tue, t(8, 0), t(14, 0)).await;
  let bruno = vet_with_shift(&sched, "Bruno", Weekday::Tue, t(8, 0), t(14, 0)).await;

  let with = |vet: &Veterinarian| AppointmentDraft {
    veterinarian_id: Some(vet.veterinarian_id),
    ..draft(&pet, tuesday(), t(10, 0))
  };
  sched.create_appointment(with(&ana)).await.unwrap();
  sched.create_appointment(with(&bruno)).await.unwrap();

  let err = sched.create_appointment(with(&ana)).await.unwrap_err();
  assert!(matches!(err, Error::SlotUnavailable { .. }));
  let err = sched
    .create_appointment(draft(&pet, tuesday(), t(10, 0)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SlotUnavailable { .. }));
}

#[tokio::test]
async fn past_dates_are_refused() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let yesterday = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();

  let err = sched
    .create_appointment(draft(&pet, yesterday, t(10, 0)))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::DateInPast { date, today })
      if date == yesterday && today == opening_day()
  ));
  assert!(sched.list_appointments(AppointmentFilter::default()).await.unwrap().is_empty());

  // Today itself is bookable.
  let appt = sched
    .create_appointment(draft(&pet, opening_day(), t(10, 0)))
    .await
    .unwrap();

  let back = AppointmentPatch { date: Some(yesterday), ..Default::default() };
  let err = sched
    .update_appointment(appt.appointment_id, back.clone())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(ValidationError::DateInPast { .. })));

  // Editing other fields of an appointment that has since slipped into the
  // past is still allowed.
  let later = Scheduler::new(Arc::clone(sched.store()), SchedulingPolicy::default())
    .with_clock(|| NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
  let note = AppointmentPatch { observations: Some("called owner".into()), ..Default::default() };
  later.update_appointment(appt.appointment_id, note).await.unwrap();

  let lenient = Scheduler::new(
    Arc::clone(sched.store()),
    SchedulingPolicy { reject_past_dates: false, ..Default::default() },
  )
  .with_clock(opening_day);
  lenient
    .create_appointment(draft(&pet, yesterday, t(11, 0)))
    .await
    .unwrap();
  let moved = lenient.update_appointment(appt.appointment_id, back).await.unwrap();
  assert_eq!(moved.date, yesterday);
}

// ─── Scheduler: update & status ──────────────────────────────────────────────

#[tokio::test]
async fn patch_can_unassign_the_veterinarian() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let ana = vet_with_shift(&sched, "Ana", Weekday::Tue, t(8, 0), t(14, 0)).await;
  let appt = sched
    .create_appointment(AppointmentDraft {
      veterinarian_id: Some(ana.veterinarian_id),
      ..draft(&pet, tuesday(), t(10, 0))
    })
    .await
    .unwrap();

  let unassign = AppointmentPatch { veterinarian_id: Some(None), ..Default::default() };
  let strict = Scheduler::new(
    Arc::clone(sched.store()),
    SchedulingPolicy { require_veterinarian: true, ..Default::default() },
  )
  .with_clock(opening_day);
  let err = strict
    .update_appointment(appt.appointment_id, unassign.clone())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::MissingField("veterinarian_id"))
  ));

  let cleared = sched
    .update_appointment(appt.appointment_id, unassign)
    .await
    .unwrap();
  assert_eq!(cleared.veterinarian_id, None);

  let reassigned = sched
    .update_appointment(
      appt.appointment_id,
      AppointmentPatch { veterinarian_id: Some(Some(ana.veterinarian_id)), ..Default::default() },
    )
    .await
    .unwrap();
  assert_eq!(reassigned.veterinarian_id, Some(ana.veterinarian_id));
}

#[tokio::test]
async fn closed_appointment_edits_skip_veterinarian_checks() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let ana = vet_with_shift(&sched, "Ana", Weekday::Tue, t(8, 0), t(14, 0)).await;
  let appt = sched
    .create_appointment(AppointmentDraft {
      veterinarian_id: Some(ana.veterinarian_id),
      ..draft(&pet, tuesday(), t(10, 0))
    })
    .await
    .unwrap();
  let id = appt.appointment_id;
  sched.change_status(id, AppointmentStatus::Confirmed).await.unwrap();
  sched.change_status(id, AppointmentStatus::Completed).await.unwrap();

  let patch = VeterinarianPatch { active: Some(false), ..Default::default() };
  sched.update_veterinarian(ana.veterinarian_id, patch).await.unwrap();

  // Ana has no Monday shift and is inactive; the record is history.
  let moved = sched
    .update_appointment(
      id,
      AppointmentPatch { date: Some(monday()), time: Some(t(16, 0)), ..Default::default() },
    )
    .await
    .unwrap();
  assert_eq!((moved.date, moved.time), (monday(), t(16, 0)));
  assert_eq!(moved.status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn update_does_not_conflict_with_itself() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let appt = sched
    .create_appointment(draft(&pet, tuesday(), t(10, 0)))
    .await
    .unwrap();

  let req = SlotRequest { exclude: Some(appt.appointment_id), ..SlotRequest::new(tuesday(), t(10, 0)) };
  assert!(!sched.has_conflict(req).await.unwrap());
  assert!(sched.has_conflict(SlotRequest::new(tuesday(), t(10, 0))).await.unwrap());

  let updated = sched
    .update_appointment(
      appt.appointment_id,
      AppointmentPatch {
        time: Some(t(10, 0)),
        reason: Some("vaccination and deworming".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap();
  assert_eq!(updated.reason, "vaccination and deworming");
  assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn rejected_move_leaves_record_unchanged() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  sched.create_appointment(draft(&pet, tuesday(), t(9, 0))).await.unwrap();
  let appt = sched
    .create_appointment(draft(&pet, tuesday(), t(11, 0)))
    .await
    .unwrap();

  let err = sched
    .update_appointment(
      appt.appointment_id,
      AppointmentPatch {
        time: Some(t(9, 0)),
        observations: Some("moved".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SlotUnavailable { .. }));

  let stored = sched.get_appointment(appt.appointment_id).await.unwrap();
  assert_eq!(stored, appt);

  let moved = sched
    .update_appointment(
      appt.appointment_id,
      AppointmentPatch { date: Some(monday()), time: Some(t(9, 0)), ..Default::default() },
    )
    .await
    .unwrap();
  assert_eq!((moved.date, moved.time), (monday(), t(9, 0)));
}

#[tokio::test]
async fn status_machine_is_enforced() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let appt = sched
    .create_appointment(draft(&pet, tuesday(), t(10, 0)))
    .await
    .unwrap();
  let id = appt.appointment_id;

  let err = sched.change_status(id, AppointmentStatus::Completed).await.unwrap_err();
  assert!(matches!(
    err,
    Error::InvalidTransition { from: AppointmentStatus::Pending, to: AppointmentStatus::Completed }
  ));
  let err = sched.change_status(id, AppointmentStatus::Pending).await.unwrap_err();
  assert!(matches!(err, Error::InvalidTransition { .. }));

  sched.change_status(id, AppointmentStatus::Confirmed).await.unwrap();
  let done = sched.change_status(id, AppointmentStatus::Completed).await.unwrap();
  assert_eq!(done.status, AppointmentStatus::Completed);

  let err = sched.cancel_appointment(id).await.unwrap_err();
  assert!(matches!(err, Error::InvalidTransition { from: AppointmentStatus::Completed, .. }));

  let err = sched
    .change_status(Uuid::new_v4(), AppointmentStatus::Confirmed)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { resource: Resource::Appointment, .. }));
}

#[tokio::test]
async fn purge_is_a_hard_delete() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let appt = sched
    .create_appointment(draft(&pet, tuesday(), t(10, 0)))
    .await
    .unwrap();

  sched.purge_appointment(appt.appointment_id).await.unwrap();
  assert!(matches!(
    sched.get_appointment(appt.appointment_id).await,
    Err(Error::NotFound { .. })
  ));
  assert!(matches!(
    sched.purge_appointment(appt.appointment_id).await,
    Err(Error::NotFound { .. })
  ));
}

// ─── Scheduler: views ────────────────────────────────────────────────────────

#[tokio::test]
async fn free_slots_follow_bookings_and_shifts() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let ana = vet_with_shift(&sched, "Ana", Weekday::Tue, t(8, 0), t(10, 0)).await;
  sched.create_appointment(draft(&pet, tuesday(), t(9, 0))).await.unwrap();

  let all = sched.free_slots(tuesday(), None).await.unwrap();
  assert_eq!(all.len(), 23);
  assert!(!all.contains(&t(9, 0)));

  let anas = sched.free_slots(tuesday(), Some(ana.veterinarian_id)).await.unwrap();
  assert_eq!(anas, vec![t(8, 0), t(8, 30), t(9, 30), t(10, 0)]);
}

#[tokio::test]
async fn history_joins_treatments_in_both_orders() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;

  let first = sched.create_appointment(draft(&pet, monday(), t(9, 0))).await.unwrap();
  let second = sched.create_appointment(draft(&pet, tuesday(), t(9, 0))).await.unwrap();
  sched.change_status(first.appointment_id, AppointmentStatus::Confirmed).await.unwrap();

  let treatment = sched
    .record_treatment(NewTreatment {
      appointment_id:      first.appointment_id,
      diagnosis:           "otitis".into(),
      indicated_treatment: "ear drops".into(),
      recommendations:     String::new(),
      medications:         vec![
        Medication { name: "Otomax".into(), dosage: "4 drops".into(), duration: "7 days".into() },
        Medication { name: " ".into(), dosage: String::new(), duration: String::new() },
      ],
    })
    .await
    .unwrap();
  assert_eq!(treatment.medications.len(), 1);

  let history = sched
    .get_pet_history(pet.pet_id, HistoryOrder::Chronological)
    .await
    .unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history[0].appointment.appointment_id, first.appointment_id);
  assert_eq!(history[0].treatment.as_ref(), Some(&treatment));
  assert!(history[1].treatment.is_none());

  let recent = sched
    .get_pet_history(pet.pet_id, HistoryOrder::MostRecentFirst)
    .await
    .unwrap();
  assert_eq!(recent[0].appointment.appointment_id, second.appointment_id);

  assert!(sched
    .get_pet_history(Uuid::new_v4(), HistoryOrder::Chronological)
    .await
    .unwrap()
    .is_empty());
}

#[tokio::test]
async fn treatment_needs_a_confirmed_or_completed_appointment() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let appt = sched.create_appointment(draft(&pet, monday(), t(9, 0))).await.unwrap();

  let input = NewTreatment {
    appointment_id:      appt.appointment_id,
    diagnosis:           "healthy".into(),
    indicated_treatment: String::new(),
    recommendations:     String::new(),
    medications:         vec![],
  };

  let err = sched.record_treatment(input.clone()).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::AppointmentNotTreatable(_, AppointmentStatus::Pending))
  ));

  sched.change_status(appt.appointment_id, AppointmentStatus::Confirmed).await.unwrap();
  sched.record_treatment(input.clone()).await.unwrap();

  let err = sched.record_treatment(input).await.unwrap_err();
  assert!(matches!(err, Error::Validation(ValidationError::TreatmentExists(_))));
}

#[tokio::test]
async fn agenda_and_summary() {
  let sched = scheduler().await;
  let (_, pet) = owner_and_pet(sched.store().as_ref()).await;
  let a = sched.create_appointment(draft(&pet, tuesday(), t(15, 0))).await.unwrap();
  sched.create_appointment(draft(&pet, tuesday(), t(9, 0))).await.unwrap();
  sched.cancel_appointment(a.appointment_id).await.unwrap();

  let agenda = sched.month_agenda(2025, 3).await.unwrap();
  let day = agenda
    .weeks
    .iter()
    .flatten()
    .find(|d| d.date == tuesday())
    .unwrap();
  let times: Vec<_> = day.appointments.iter().map(|x| x.time).collect();
  assert_eq!(times, vec![t(9, 0), t(15, 0)]);

  let err = sched.month_agenda(2025, 13).await.unwrap_err();
  assert!(matches!(err, Error::Validation(ValidationError::InvalidMonth { .. })));

  let summary = sched.summary(tuesday()).await.unwrap();
  assert_eq!(summary.total, 2);
  assert_eq!(summary.active, 1);
  assert_eq!(summary.today, 2);
  assert_eq!(summary.by_status[&AppointmentStatus::Cancelled], 1);
  assert_eq!(summary.by_status[&AppointmentStatus::Completed], 0);
}

#[tokio::test]
async fn register_pet_requires_existing_owner() {
  let sched = scheduler().await;
  let err = sched
    .register_pet(new_pet(Uuid::new_v4(), "Luna"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { resource: Resource::Client, .. }));

  let client = sched.register_client(new_client("Marta")).await.unwrap();
  let pet = sched.register_pet(new_pet(client.client_id, "Luna")).await.unwrap();
  assert_eq!(sched.list_pets(Some(client.client_id)).await.unwrap(), vec![pet]);

  let err = sched
    .register_client(NewClient { name: String::new(), ..new_client("x") })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(ValidationError::MissingField("name"))));
}
