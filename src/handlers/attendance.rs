use axum::{
    Form,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::error::RollcallError;
use crate::middleware::auth::CurrentUser;
use crate::router::RollcallState;
use crate::service::export;
use crate::views;

/// Raw form fields; parsed by hand so bad input re-renders the form instead of a bare rejection.
#[derive(Debug, Default, Deserialize)]
pub struct MarkAttendanceForm {
    #[serde(default)]
    pub participant_id: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl MarkAttendanceForm {
    fn parse(&self) -> Result<(i64, i64, Option<NaiveDate>), RollcallError> {
        let participant_id = parse_id(&self.participant_id, "participant")?;
        let event_id = parse_id(&self.event_id, "event")?;
        let date = match self.date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                RollcallError::Validation(format!("Date \"{raw}\" is not a valid YYYY-MM-DD date"))
            })?),
        };
        Ok((participant_id, event_id, date))
    }
}

fn parse_id(raw: &str, what: &str) -> Result<i64, RollcallError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RollcallError::Validation(format!("Please choose a {what}")));
    }
    raw.parse::<i64>()
        .map_err(|_| RollcallError::Validation(format!("Invalid {what} id \"{raw}\"")))
}

async fn render_mark_form(
    state: &RollcallState,
    error: Option<&str>,
) -> Result<String, RollcallError> {
    let participants = state.storage.list_participants(None).await?;
    let events = state.storage.list_events().await?;
    Ok(views::mark_attendance_page(&participants, &events, error))
}

/// GET /mark_attendance -> participant and event pick-lists.
pub async fn mark_attendance_form(
    State(state): State<RollcallState>,
    _user: CurrentUser,
) -> Result<Html<String>, RollcallError> {
    Ok(Html(render_mark_form(&state, None).await?))
}

/// POST /mark_attendance -> insert (date defaults to today) and show the listing.
pub async fn mark_attendance_submit(
    State(state): State<RollcallState>,
    user: CurrentUser,
    Form(form): Form<MarkAttendanceForm>,
) -> Result<Response, RollcallError> {
    let res = match form.parse() {
        Ok((participant_id, event_id, date)) => {
            state
                .storage
                .record_attendance(participant_id, event_id, date)
                .await
        }
        Err(err) => Err(err),
    };

    match res {
        Ok(id) => {
            info!(id, by = %user.username, "attendance marked");
            Ok(Redirect::to("/view_attendance").into_response())
        }
        Err(err) if err.is_recoverable() => {
            let page = render_mark_form(&state, Some(&err.user_message())).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response())
        }
        Err(err) => Err(err),
    }
}

/// GET /view_attendance -> joined listing, most recent first.
pub async fn view_attendance(
    State(state): State<RollcallState>,
    _user: CurrentUser,
) -> Result<Html<String>, RollcallError> {
    let rows = state.storage.list_attendance().await?;
    Ok(Html(views::attendance_page(&rows)))
}

/// GET /export_attendance -> CSV download of the same listing.
pub async fn export_attendance(
    State(state): State<RollcallState>,
    user: CurrentUser,
) -> Result<Response, RollcallError> {
    let artifact = export::export_attendance(&state.storage).await?;
    info!(by = %user.username, file = %artifact.filename, "export served");
    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}
