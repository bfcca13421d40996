use axum::{
    Router,
    extract::FromRef,
    routing::get,
};
use axum_extra::extract::cookie::Key;

use crate::auth::SessionStore;
use crate::config::Config;
use crate::db::AttendanceStorage;
use crate::error::RollcallError;
use crate::handlers::{attendance, auth, dashboard, participants};

#[derive(Clone)]
pub struct RollcallState {
    pub storage: AttendanceStorage,
    pub sessions: SessionStore,
    pub insecure_cookie: bool,
    cookie_key: Key,
}

impl RollcallState {
    pub fn new(storage: AttendanceStorage, cookie_key: Key, insecure_cookie: bool) -> Self {
        Self {
            storage,
            sessions: SessionStore::new(),
            insecure_cookie,
            cookie_key,
        }
    }

    pub fn from_config(storage: AttendanceStorage, cfg: &Config) -> Result<Self, RollcallError> {
        let key = cookie_key(cfg.cookie_secret.as_deref())?;
        Ok(Self::new(storage, key, cfg.insecure_cookie))
    }
}

impl FromRef<RollcallState> for Key {
    fn from_ref(state: &RollcallState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the private-cookie key from configuration, or generate a per-process one.
pub fn cookie_key(secret: Option<&str>) -> Result<Key, RollcallError> {
    match secret {
        Some(secret) => Key::try_from(secret.as_bytes()).map_err(|_| {
            RollcallError::InvalidConfig("cookie_secret must be at least 64 bytes".to_string())
        }),
        None => Ok(Key::generate()),
    }
}

pub fn rollcall_router(state: RollcallState) -> Router {
    Router::new()
        .route("/", get(auth::login_form).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        .route("/dashboard", get(dashboard::dashboard))
        .route(
            "/add_participant",
            get(participants::add_participant_form).post(participants::add_participant_submit),
        )
        .route("/view_participants", get(participants::view_participants))
        .route(
            "/mark_attendance",
            get(attendance::mark_attendance_form).post(attendance::mark_attendance_submit),
        )
        .route("/view_attendance", get(attendance::view_attendance))
        .route("/export_attendance", get(attendance::export_attendance))
        .with_state(state)
}
