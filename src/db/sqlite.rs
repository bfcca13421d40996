use crate::auth::password;
use crate::config::{AdminSeed, EventSeed};
use crate::db::models::{AttendanceRow, Counts, DbCredential, Event, NewParticipant, Participant};
use crate::db::schema::SQLITE_INIT;
use crate::error::RollcallError;
use chrono::{Local, NaiveDate};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

pub type SqlitePool = Pool<Sqlite>;

/// What a bootstrap pass actually inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub events_created: usize,
}

#[derive(Clone)]
pub struct AttendanceStorage {
    pool: SqlitePool,
}

impl AttendanceStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the SQLite file behind `database_url`.
    /// Foreign keys are switched on for every pooled connection.
    pub async fn connect(database_url: &str) -> Result<Self, RollcallError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), RollcallError> {
        // sqlx::query runs a single statement
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Create tables if absent and seed the admin credential and default events.
    /// Safe to call on every start: seeds are inserted only when missing.
    pub async fn ensure_schema(
        &self,
        admin: &AdminSeed,
        events: &[EventSeed],
    ) -> Result<SeedReport, RollcallError> {
        self.init_schema().await?;

        let mut report = SeedReport::default();

        if self.find_credential(&admin.username).await?.is_none() {
            let hash = password::hash_password(&admin.password)?;
            let res = sqlx::query(
                "INSERT INTO users (username, password_hash) VALUES (?, ?)
                 ON CONFLICT(username) DO NOTHING",
            )
            .bind(&admin.username)
            .bind(hash)
            .execute(&self.pool)
            .await?;
            report.admin_created = res.rows_affected() > 0;
        }

        for seed in events {
            let res = sqlx::query(
                "INSERT INTO events (name, frequency) VALUES (?, ?)
                 ON CONFLICT(name) DO NOTHING",
            )
            .bind(&seed.name)
            .bind(seed.frequency_per_month)
            .execute(&self.pool)
            .await?;
            report.events_created += res.rows_affected() as usize;
        }

        info!(
            admin_created = report.admin_created,
            events_created = report.events_created,
            "schema ready"
        );
        Ok(report)
    }

    pub async fn find_credential(
        &self,
        username: &str,
    ) -> Result<Option<DbCredential>, RollcallError> {
        let row = sqlx::query_as::<_, DbCredential>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Insert a participant. The name must be non-empty after trimming;
    /// blank optional fields are stored as NULL.
    pub async fn create_participant(&self, input: NewParticipant) -> Result<i64, RollcallError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(RollcallError::validation("Participant name is required"));
        }
        let district = non_blank(input.district.as_deref());
        let contact = non_blank(input.contact.as_deref());

        let res = sqlx::query("INSERT INTO participants (name, district, contact) VALUES (?, ?, ?)")
            .bind(name)
            .bind(district)
            .bind(contact)
            .execute(&self.pool)
            .await?;
        let id = res.last_insert_rowid();
        debug!(id, name, "participant created");
        Ok(id)
    }

    /// All participants, or only those whose district equals `district` exactly.
    pub async fn list_participants(
        &self,
        district: Option<&str>,
    ) -> Result<Vec<Participant>, RollcallError> {
        let rows = match non_blank(district) {
            Some(d) => {
                sqlx::query_as::<_, Participant>(
                    "SELECT id, name, district, contact FROM participants
                     WHERE district = ? ORDER BY id",
                )
                .bind(d)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Participant>(
                    "SELECT id, name, district, contact FROM participants ORDER BY id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn get_participant(&self, id: i64) -> Result<Option<Participant>, RollcallError> {
        let row = sqlx::query_as::<_, Participant>(
            "SELECT id, name, district, contact FROM participants WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Remove a participant and, through the cascade, its attendance records.
    pub async fn delete_participant(&self, id: i64) -> Result<bool, RollcallError> {
        let res = sqlx::query("DELETE FROM participants WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn create_event(
        &self,
        name: &str,
        frequency_per_month: i64,
    ) -> Result<i64, RollcallError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RollcallError::validation("Event name is required"));
        }
        if frequency_per_month <= 0 {
            return Err(RollcallError::validation(
                "Event frequency must be a positive number per month",
            ));
        }

        let res = sqlx::query("INSERT INTO events (name, frequency) VALUES (?, ?)")
            .bind(name)
            .bind(frequency_per_month)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    RollcallError::Validation(format!("Event \"{name}\" already exists"))
                }
                other => other.into(),
            })?;
        Ok(res.last_insert_rowid())
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, RollcallError> {
        let rows = sqlx::query_as::<_, Event>("SELECT id, name, frequency FROM events ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Remove an event and, through the cascade, its attendance records.
    pub async fn delete_event(&self, id: i64) -> Result<bool, RollcallError> {
        let res = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Record that a participant attended an event. `date` defaults to today.
    /// Unknown participant or event ids surface as `RollcallError::Referential`.
    pub async fn record_attendance(
        &self,
        participant_id: i64,
        event_id: i64,
        date: Option<NaiveDate>,
    ) -> Result<i64, RollcallError> {
        let date = date.unwrap_or_else(|| Local::now().date_naive());

        let res = sqlx::query(
            "INSERT INTO attendance (participant_id, event_id, date) VALUES (?, ?, ?)",
        )
        .bind(participant_id)
        .bind(event_id)
        .bind(date)
        .execute(&self.pool)
        .await;

        match res {
            Ok(done) => {
                let id = done.last_insert_rowid();
                debug!(id, participant_id, event_id, %date, "attendance recorded");
                Ok(id)
            }
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(self.describe_missing_reference(participant_id, event_id).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn describe_missing_reference(
        &self,
        participant_id: i64,
        event_id: i64,
    ) -> Result<RollcallError, RollcallError> {
        let participant_exists = self.row_exists("participants", participant_id).await?;
        let event_exists = self.row_exists("events", event_id).await?;
        let msg = match (participant_exists, event_exists) {
            (false, false) => {
                format!("Participant {participant_id} and event {event_id} do not exist")
            }
            (false, true) => format!("Participant {participant_id} does not exist"),
            (true, false) => format!("Event {event_id} does not exist"),
            (true, true) => {
                format!("Participant {participant_id} or event {event_id} does not exist")
            }
        };
        Ok(RollcallError::Referential(msg))
    }

    async fn row_exists(&self, table: &'static str, id: i64) -> Result<bool, RollcallError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
        let (exists,): (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(exists)
    }

    /// Attendance joined with participant and event, most recent day first.
    /// Records on the same day keep insertion order.
    pub async fn list_attendance(&self) -> Result<Vec<AttendanceRow>, RollcallError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"SELECT p.name AS participant_name, p.district AS district,
                      e.name AS event_name, a.date AS date
               FROM attendance a
               JOIN participants p ON a.participant_id = p.id
               JOIN events e ON a.event_id = e.id
               ORDER BY a.date DESC, a.id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn counts(&self) -> Result<Counts, RollcallError> {
        let (participants, events, attendance): (i64, i64, i64) = sqlx::query_as(
            r#"SELECT (SELECT COUNT(*) FROM participants),
                      (SELECT COUNT(*) FROM events),
                      (SELECT COUNT(*) FROM attendance)"#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(Counts {
            participants,
            events,
            attendance,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
