//! SQL schema for the clinic SQLite store.
//!
//! Dates are `YYYY-MM-DD` and times of day `HH:MM`, so text comparison
//! orders them correctly. Weekdays are stored as days from Monday (0..=6).

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS clients (
    client_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    phone       TEXT,
    email       TEXT,
    address     TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pets (
    pet_id      TEXT PRIMARY KEY,
    client_id   TEXT NOT NULL REFERENCES clients(client_id),
    name        TEXT NOT NULL,
    species     TEXT NOT NULL,
    breed       TEXT,
    age         INTEGER,
    sex         TEXT,
    weight_kg   REAL,
    created_at  TEXT NOT NULL
);

-- Never deleted; `active = 0` retires a veterinarian.
CREATE TABLE IF NOT EXISTS veterinarians (
    veterinarian_id TEXT PRIMARY KEY,
    name            TEXT NOT NULL,
    specialty       TEXT,
    phone           TEXT,
    email           TEXT,
    active          INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS shifts (
    shift_id        TEXT PRIMARY KEY,
    veterinarian_id TEXT NOT NULL REFERENCES veterinarians(veterinarian_id),
    weekday         INTEGER NOT NULL CHECK (weekday BETWEEN 0 AND 6),
    start_time      TEXT NOT NULL,
    end_time        TEXT NOT NULL,
    CHECK (start_time < end_time)
);

CREATE TABLE IF NOT EXISTS appointments (
    appointment_id  TEXT PRIMARY KEY,
    date            TEXT NOT NULL,
    time            TEXT NOT NULL,
    reason          TEXT NOT NULL,
    status          TEXT NOT NULL,   -- 'pending' | 'confirmed' | 'completed' | 'cancelled'
    pet_id          TEXT NOT NULL REFERENCES pets(pet_id),
    client_id       TEXT NOT NULL REFERENCES clients(client_id),
    veterinarian_id TEXT REFERENCES veterinarians(veterinarian_id),
    observations    TEXT NOT NULL DEFAULT '',
    created_at      TEXT NOT NULL,
    updated_at      TEXT
);

CREATE TABLE IF NOT EXISTS treatments (
    treatment_id        TEXT PRIMARY KEY,
    appointment_id      TEXT NOT NULL UNIQUE
                        REFERENCES appointments(appointment_id) ON DELETE CASCADE,
    diagnosis           TEXT NOT NULL,
    indicated_treatment TEXT NOT NULL DEFAULT '',
    recommendations     TEXT NOT NULL DEFAULT '',
    created_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS medications (
    treatment_id TEXT NOT NULL REFERENCES treatments(treatment_id) ON DELETE CASCADE,
    position     INTEGER NOT NULL,
    name         TEXT NOT NULL,
    dosage       TEXT NOT NULL DEFAULT '',
    duration     TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (treatment_id, position)
);

CREATE INDEX IF NOT EXISTS appointments_slot_idx ON appointments(date, time);
CREATE INDEX IF NOT EXISTS appointments_pet_idx  ON appointments(pet_id);
CREATE INDEX IF NOT EXISTS shifts_vet_idx        ON shifts(veterinarian_id);
CREATE INDEX IF NOT EXISTS pets_client_idx       ON pets(client_id);

PRAGMA user_version = 1;
";
