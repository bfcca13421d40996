//! SQL DDL for initializing the attendance store.
//! Every statement is idempotent so it can run on each process start.

/// SQLite schema with:
/// - `users.username` UNIQUE; only a salted hash of the password is stored
/// - `events.name` UNIQUE, `frequency` checked positive (informational only)
/// - `attendance` foreign keys cascading on participant/event deletion
/// - `date` stored as ISO-8601 `YYYY-MM-DD` text so ordering by text is ordering by day
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS participants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    district TEXT NULL,
    contact TEXT NULL
);

CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    frequency INTEGER NOT NULL CHECK (frequency > 0)
);

CREATE TABLE IF NOT EXISTS attendance (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    participant_id INTEGER NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
    event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_participants_district ON participants(district);
CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date);
CREATE INDEX IF NOT EXISTS idx_attendance_participant_id ON attendance(participant_id);
CREATE INDEX IF NOT EXISTS idx_attendance_event_id ON attendance(event_id);
"#;
