//! Plain-text rendering of API responses.

use std::fmt::Write as _;

use chrono::Datelike as _;

use clinic_core::{
  agenda::{MonthAgenda, Summary},
  appointment::Appointment,
  history::Visit,
  staff::Veterinarian,
  time::format_hhmm,
};

pub fn appointment(a: &Appointment) -> String {
  let vet = a
    .veterinarian_id
    .map_or_else(|| "unassigned".to_owned(), |id| id.to_string());
  format!(
    "{} {} {:<9} {}  pet={} vet={}  {}",
    a.date,
    format_hhmm(a.time),
    a.status,
    a.appointment_id,
    a.pet_id,
    vet,
    a.reason,
  )
}

pub fn veterinarian(v: &Veterinarian) -> String {
  let mut line = format!("{}  {}", v.veterinarian_id, v.name);
  if let Some(specialty) = &v.specialty {
    let _ = write!(line, " ({specialty})");
  }
  if !v.active {
    line.push_str(" [inactive]");
  }
  line
}

pub fn visit(v: &Visit) -> String {
  let a = &v.appointment;
  let mut out = format!("{} {}  {}  [{}]\n", a.date, format_hhmm(a.time), a.reason, a.status);
  if !a.observations.is_empty() {
    let _ = writeln!(out, "  notes: {}", a.observations);
  }
  if let Some(t) = &v.treatment {
    let _ = writeln!(out, "  diagnosis: {}", t.diagnosis);
    if !t.indicated_treatment.is_empty() {
      let _ = writeln!(out, "  treatment: {}", t.indicated_treatment);
    }
    for m in &t.medications {
      let _ = writeln!(out, "  - {} {} for {}", m.name, m.dosage, m.duration);
    }
    if !t.recommendations.is_empty() {
      let _ = writeln!(out, "  recommendations: {}", t.recommendations);
    }
  }
  out
}

/// A Monday-first grid; each cell shows the day and its booking count.
/// Days outside the month are dimmed to `·`.
pub fn agenda(m: &MonthAgenda) -> String {
  let mut out = format!("{:04}-{:02}\n Mon  Tue  Wed  Thu  Fri  Sat  Sun\n", m.year, m.month);
  for week in &m.weeks {
    for day in week {
      let cell = if !day.in_month {
        "  · ".to_owned()
      } else if day.appointments.is_empty() {
        format!("{:>3} ", day.date.day())
      } else {
        format!("{:>3}*", day.date.day())
      };
      out.push_str(&cell);
      out.push(' ');
    }
    out.truncate(out.trim_end().len());
    out.push('\n');
  }
  for day in m.weeks.iter().flatten().filter(|d| d.in_month) {
    for a in &day.appointments {
      let _ = writeln!(out, "{}", appointment(a));
    }
  }
  out
}

pub fn summary(s: &Summary) -> String {
  let mut out = format!("total {}  active {}  today {}\n", s.total, s.active, s.today);
  for (status, n) in &s.by_status {
    let _ = writeln!(out, "  {status:<9} {n}");
  }
  out
}
