use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbCredential {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub district: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "frequency")]
    pub frequency_per_month: i64,
}

/// One line of the attendance report: a record joined with its participant and event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct AttendanceRow {
    pub participant_name: String,
    pub district: Option<String>,
    pub event_name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub participants: i64,
    pub events: i64,
    pub attendance: i64,
}

/// Input for `create_participant`, as submitted by the add form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewParticipant {
    pub name: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}
