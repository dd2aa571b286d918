//! SQL DDL for the donation store.
//! Every statement is `IF NOT EXISTS`, so running it against an existing
//! database is a no-op.

/// SQLite schema:
/// - `shelf_life.medicine_name` is UNIQUE under NOCASE collation
/// - dates are ISO `YYYY-MM-DD` text, timestamps RFC3339 text
/// - `donations.matched_ngo_id` references `ngos(id)` without cascade
/// - `ngo_connections` rows go away with their donation
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS shelf_life (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    medicine_name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    shelf_months INTEGER NOT NULL,
    notes TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS ngos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    city TEXT NOT NULL,
    contact TEXT NOT NULL DEFAULT '',
    accepts TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS donations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    donor_name TEXT NOT NULL,
    donor_city TEXT NOT NULL DEFAULT '',
    medicine_name TEXT NOT NULL,
    batch_date TEXT NOT NULL,
    expiry_date TEXT NULL,
    status TEXT NOT NULL DEFAULT 'pledged',
    matched_ngo_id INTEGER NULL REFERENCES ngos(id),
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ngo_connections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ngo_id INTEGER NOT NULL REFERENCES ngos(id),
    donation_id INTEGER NOT NULL REFERENCES donations(id) ON DELETE CASCADE,
    message TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS audio_transcriptions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL,
    filepath TEXT NOT NULL,
    uploader TEXT NOT NULL,
    uploaded_at TEXT NOT NULL,
    transcription TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_ngos_city ON ngos(city);
CREATE INDEX IF NOT EXISTS idx_ngo_connections_ngo_id ON ngo_connections(ngo_id);
"#;
