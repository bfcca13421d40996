use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::db::NewParticipant;
use crate::error::RollcallError;
use crate::middleware::auth::CurrentUser;
use crate::router::RollcallState;
use crate::views;

#[derive(Debug, Default, Deserialize)]
pub struct ParticipantFilter {
    pub district: Option<String>,
}

pub async fn add_participant_form(_user: CurrentUser) -> Html<String> {
    Html(views::add_participant_page(None, &NewParticipant::default()))
}

/// POST /add_participant -> insert, or re-render the form with the validation message.
pub async fn add_participant_submit(
    State(state): State<RollcallState>,
    user: CurrentUser,
    Form(form): Form<NewParticipant>,
) -> Result<Response, RollcallError> {
    match state.storage.create_participant(form.clone()).await {
        Ok(id) => {
            info!(id, by = %user.username, "participant added");
            Ok(Redirect::to("/view_participants").into_response())
        }
        Err(err) if err.is_recoverable() => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(views::add_participant_page(Some(&err.user_message()), &form)),
        )
            .into_response()),
        Err(err) => Err(err),
    }
}

/// GET /view_participants?district=<exact match>
pub async fn view_participants(
    State(state): State<RollcallState>,
    _user: CurrentUser,
    Query(filter): Query<ParticipantFilter>,
) -> Result<Html<String>, RollcallError> {
    let district = filter.district.as_deref();
    let participants = state.storage.list_participants(district).await?;
    Ok(Html(views::participants_page(&participants, district)))
}
