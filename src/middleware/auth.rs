use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use tracing::debug;

use crate::auth::SessionToken;
use crate::router::RollcallState;

pub const SESSION_COOKIE: &str = "rollcall_session";

/// Session token carried by the request's private cookie, if any.
pub fn session_token(jar: &PrivateCookieJar) -> Option<SessionToken> {
    jar.get(SESSION_COOKIE)
        .map(|c| SessionToken::from(c.value().to_owned()))
}

pub fn build_session_cookie(token: &SessionToken, secure: bool) -> Cookie<'static> {
    // No max-age: the cookie lives for the browser session only.
    Cookie::build(Cookie::new(SESSION_COOKIE, token.as_str().to_owned()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Extractor for protected routes: the logged-in user behind the session cookie.
/// Requests without a live session are redirected to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
}

impl FromRequestParts<RollcallState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &RollcallState,
    ) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;
        let token = session_token(&jar);

        let session = state
            .sessions
            .require(token.as_ref())
            .await
            .map_err(|err| {
                debug!(path = %parts.uri.path(), "no session; redirecting to login");
                err.into_response()
            })?;

        Ok(Self {
            username: session.username,
        })
    }
}
