//! Database module: models, schema and the SQLite-backed repository.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: connection setup, bootstrap seeding and repository operations

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{AttendanceRow, Counts, DbCredential, Event, NewParticipant, Participant};
pub use schema::SQLITE_INIT;
pub use sqlite::{AttendanceStorage, SqlitePool};
