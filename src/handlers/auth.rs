use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::info;

use crate::auth;
use crate::error::RollcallError;
use crate::middleware::auth::{build_session_cookie, clear_session_cookie, session_token};
use crate::router::RollcallState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET / -> login form, or straight to the dashboard when already signed in.
pub async fn login_form(State(state): State<RollcallState>, jar: PrivateCookieJar) -> Response {
    let token = session_token(&jar);
    if state.sessions.require(token.as_ref()).await.is_ok() {
        return Redirect::to("/dashboard").into_response();
    }
    Html(views::login_page(None)).into_response()
}

/// POST / -> verify credentials and start a session.
pub async fn login_submit(
    State(state): State<RollcallState>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, RollcallError> {
    let token =
        auth::authenticate(&state.storage, &state.sessions, &form.username, &form.password).await?;

    // Replace any session this browser already held.
    if let Some(previous) = session_token(&jar) {
        state.sessions.revoke(&previous).await;
    }

    let jar = jar.add(build_session_cookie(&token, !state.insecure_cookie));
    Ok((jar, Redirect::to("/dashboard")).into_response())
}

/// GET /logout -> drop the session and its cookie.
pub async fn logout(State(state): State<RollcallState>, jar: PrivateCookieJar) -> Response {
    if let Some(token) = session_token(&jar)
        && state.sessions.revoke(&token).await
    {
        info!("session closed");
    }
    let jar = jar.remove(clear_session_cookie());
    (jar, Redirect::to("/")).into_response()
}
