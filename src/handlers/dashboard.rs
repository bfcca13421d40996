use axum::{extract::State, response::Html};

use crate::error::RollcallError;
use crate::middleware::auth::CurrentUser;
use crate::router::RollcallState;
use crate::views;

/// GET /dashboard -> participant, event and attendance totals.
pub async fn dashboard(
    State(state): State<RollcallState>,
    user: CurrentUser,
) -> Result<Html<String>, RollcallError> {
    let counts = state.storage.counts().await?;
    Ok(Html(views::dashboard_page(&user.username, &counts)))
}
