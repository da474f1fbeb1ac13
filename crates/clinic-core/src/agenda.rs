//! Calendar and dashboard views over the appointment set.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{appointment::Appointment, lifecycle::AppointmentStatus};

// ─── Month grid ──────────────────────────────────────────────────────────────

/// One cell of the month grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAgenda {
  pub date:         NaiveDate,
  /// `false` for the leading/trailing days borrowed from adjacent months.
  pub in_month:     bool,
  /// Sorted by time of day.
  pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthAgenda {
  pub year:  i32,
  pub month: u32,
  /// Monday-first weeks covering the whole month.
  pub weeks: Vec<Vec<DayAgenda>>,
}

/// First Monday on or before the 1st and last Sunday on or after the last
/// day of the month. `None` for a month that does not exist.
pub fn grid_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)?;
  let next_first = if month == 12 {
    NaiveDate::from_ymd_opt(year + 1, 1, 1)?
  } else {
    NaiveDate::from_ymd_opt(year, month + 1, 1)?
  };
  let last = next_first.pred_opt()?;

  let lead = u64::from(first.weekday().num_days_from_monday());
  let trail = 6 - u64::from(last.weekday().num_days_from_monday());
  Some((
    first.checked_sub_days(Days::new(lead))?,
    last.checked_add_days(Days::new(trail))?,
  ))
}

/// Lay `appointments` out on the month grid. Appointments outside the grid
/// are dropped.
pub fn month_agenda(
  year: i32,
  month: u32,
  appointments: Vec<Appointment>,
) -> Option<MonthAgenda> {
  let (start, end) = grid_bounds(year, month)?;

  let mut by_day: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();
  for a in appointments {
    if (start..=end).contains(&a.date) {
      by_day.entry(a.date).or_default().push(a);
    }
  }

  let days: Vec<DayAgenda> = start
    .iter_days()
    .take_while(|d| *d <= end)
    .map(|date| {
      let mut appointments = by_day.remove(&date).unwrap_or_default();
      appointments.sort_by_key(|a| (a.time, a.created_at));
      DayAgenda {
        date,
        in_month: date.month() == month,
        appointments,
      }
    })
    .collect();

  let weeks = days.chunks(7).map(<[DayAgenda]>::to_vec).collect();
  Some(MonthAgenda { year, month, weeks })
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Headline counts for the staff dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  pub total:     usize,
  /// Pending plus confirmed.
  pub active:    usize,
  /// Appointments on `today`, any status.
  pub today:     usize,
  /// Every status is present, zero-filled.
  pub by_status: BTreeMap<AppointmentStatus, usize>,
}

pub fn summarize(appointments: &[Appointment], today: NaiveDate) -> Summary {
  let mut by_status: BTreeMap<AppointmentStatus, usize> =
    AppointmentStatus::iter().map(|s| (s, 0)).collect();
  for a in appointments {
    *by_status.entry(a.status).or_default() += 1;
  }

  Summary {
    total: appointments.len(),
    active: appointments.iter().filter(|a| a.status.holds_slot()).count(),
    today: appointments.iter().filter(|a| a.date == today).count(),
    by_status,
  }
}
