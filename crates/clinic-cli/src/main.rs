//! `clinic`: command-line client for the clinic scheduling service.
//!
//! # Usage
//!
//! ```text
//! clinic --url http://localhost:8080 slots
//! clinic free-slots 2025-03-04
//! clinic book --pet <PET_ID> --date 2025-03-04 --time 10:00 --reason "vaccine"
//! clinic status <APPOINTMENT_ID> confirmed
//! clinic --role admin purge <APPOINTMENT_ID>
//! ```

mod client;
mod render;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use clinic_core::{
  appointment::{AppointmentDraft, AppointmentFilter, AppointmentPatch},
  history::HistoryOrder,
  lifecycle::AppointmentStatus,
  time::parse_hhmm,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://localhost:8080";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "clinic", about = "Command-line client for the clinic scheduling service")]
struct Args {
  /// Path to a TOML config file (url, role).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the clinic server (default: http://localhost:8080).
  #[arg(long, env = "CLINIC_URL")]
  url: Option<String>,

  /// Role sent to the server: admin, staff or client.
  #[arg(long, env = "CLINIC_ROLE")]
  role: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the daily slot catalog.
  Slots,

  /// Veterinarians on shift at a date and time.
  Available {
    date: NaiveDate,
    #[arg(value_parser = parse_hhmm)]
    time: NaiveTime,
  },

  /// Slots still open on a date, clinic-wide or for one veterinarian.
  FreeSlots {
    date: NaiveDate,
    #[arg(long)]
    vet:  Option<Uuid>,
  },

  /// List veterinarians.
  Vets,

  /// List appointments, optionally filtered.
  List {
    #[arg(long)]
    date:   Option<NaiveDate>,
    #[arg(long)]
    status: Option<AppointmentStatus>,
    #[arg(long)]
    pet:    Option<Uuid>,
    #[arg(long)]
    vet:    Option<Uuid>,
  },

  /// Book an appointment. The client defaults to the pet's owner.
  Book {
    #[arg(long)]
    pet:    Uuid,
    #[arg(long)]
    client: Option<Uuid>,
    #[arg(long)]
    date:   NaiveDate,
    #[arg(long, value_parser = parse_hhmm)]
    time:   NaiveTime,
    #[arg(long)]
    reason: String,
    #[arg(long)]
    vet:    Option<Uuid>,
    #[arg(long, default_value = "")]
    notes:  String,
  },

  /// Move an appointment or reassign its veterinarian.
  Reschedule {
    id:       Uuid,
    #[arg(long)]
    date:     Option<NaiveDate>,
    #[arg(long, value_parser = parse_hhmm)]
    time:     Option<NaiveTime>,
    #[arg(long, conflicts_with = "unassign")]
    vet:      Option<Uuid>,
    /// Remove the assigned veterinarian.
    #[arg(long)]
    unassign: bool,
  },

  /// Set an appointment's status (pending, confirmed, completed, cancelled).
  Status { id: Uuid, status: AppointmentStatus },

  /// Cancel an appointment, freeing its slot.
  Cancel { id: Uuid },

  /// Delete an appointment outright. Requires `--role admin`.
  Purge { id: Uuid },

  /// A pet's visits with their treatments.
  History {
    pet:          Uuid,
    /// Newest visit first.
    #[arg(long)]
    newest_first: bool,
  },

  /// Month calendar, Monday-first.
  Agenda { year: i32, month: u32 },

  /// Appointment counts.
  Summary {
    /// Reference date for the "today" count (default: the server's date).
    #[arg(long)]
    today: Option<NaiveDate>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
struct ConfigFile {
  #[serde(default)]
  url:  String,
  #[serde(default)]
  role: String,
}

/// Flags (and their env vars) override the config file, which overrides
/// defaults.
fn resolve_config(url: Option<String>, role: Option<String>, file: ConfigFile) -> ApiConfig {
  ApiConfig {
    base_url: url
      .or_else(|| (!file.url.is_empty()).then(|| file.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    role:     role.or_else(|| (!file.role.is_empty()).then(|| file.role.clone())),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  let api_config = resolve_config(args.url, args.role, file_cfg);
  tracing::debug!(url = %api_config.base_url, role = ?api_config.role, "using server");

  let client = ApiClient::new(api_config)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::Slots => {
      println!("{}", client.slots().await?.join("  "));
    }
    Command::Available { date, time } => {
      let vets = client.availability(date, time).await?;
      if vets.is_empty() {
        println!("nobody on shift");
      }
      for vet in &vets {
        println!("{}", render::veterinarian(vet));
      }
    }
    Command::FreeSlots { date, vet } => {
      let free = client.free_slots(date, vet).await?;
      if free.is_empty() {
        println!("no free slots");
      } else {
        println!("{}", free.join("  "));
      }
    }
    Command::Vets => {
      for vet in client.veterinarians().await? {
        println!("{}", render::veterinarian(&vet));
      }
    }
    Command::List { date, status, pet, vet } => {
      let filter = AppointmentFilter {
        status,
        pet_id: pet,
        veterinarian_id: vet,
        date,
        ..AppointmentFilter::default()
      };
      for appt in client.list_appointments(&filter).await? {
        println!("{}", render::appointment(&appt));
      }
    }
    Command::Book { pet, client: owner, date, time, reason, vet, notes } => {
      let owner = match owner {
        Some(id) => id,
        None => client.pet(pet).await?.client_id,
      };
      let draft = AppointmentDraft {
        date:            Some(date),
        time:            Some(time),
        reason,
        pet_id:          Some(pet),
        client_id:       Some(owner),
        veterinarian_id: vet,
        observations:    notes,
      };
      let appt = client.book(&draft).await?;
      println!("booked {}", render::appointment(&appt));
    }
    Command::Reschedule { id, date, time, vet, unassign } => {
      let veterinarian_id = if unassign { Some(None) } else { vet.map(Some) };
      let patch = AppointmentPatch {
        date,
        time,
        veterinarian_id,
        ..AppointmentPatch::default()
      };
      let appt = client.update(id, &patch).await?;
      println!("{}", render::appointment(&appt));
    }
    Command::Status { id, status } => {
      let appt = client.change_status(id, status).await?;
      println!("{}", render::appointment(&appt));
    }
    Command::Cancel { id } => {
      let appt = client.cancel(id).await?;
      println!("{}", render::appointment(&appt));
    }
    Command::Purge { id } => {
      client.purge(id).await?;
      println!("deleted {id}");
    }
    Command::History { pet, newest_first } => {
      let order = if newest_first {
        HistoryOrder::MostRecentFirst
      } else {
        HistoryOrder::Chronological
      };
      let visits = client.history(pet, order).await?;
      if visits.is_empty() {
        println!("no visits");
      }
      for visit in &visits {
        print!("{}", render::visit(visit));
      }
    }
    Command::Agenda { year, month } => {
      print!("{}", render::agenda(&client.agenda(year, month).await?));
    }
    Command::Summary { today } => {
      print!("{}", render::summary(&client.summary(today).await?));
    }
  }
  Ok(())
}
