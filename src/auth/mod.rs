//! Credential verification and login sessions.

pub mod password;
pub mod session;

pub use session::{SessionStore, SessionToken};

use crate::db::AttendanceStorage;
use crate::error::{AuthFailure, RollcallError};
use tracing::{info, warn};

/// Check `username`/`password` against the stored credential and open a session.
pub async fn authenticate(
    storage: &AttendanceStorage,
    sessions: &SessionStore,
    username: &str,
    password: &str,
) -> Result<SessionToken, RollcallError> {
    let username = username.trim();
    let credential = storage.find_credential(username).await?;

    // Unknown users still pay for one verification.
    let verified = match credential.as_ref() {
        Some(cred) => password::verify_password(password, &cred.password_hash),
        None => {
            let _ = password::verify_password(password, &password::DUMMY_HASH);
            false
        }
    };

    if !verified {
        warn!(username, "login rejected");
        return Err(RollcallError::Auth(AuthFailure::InvalidCredentials));
    }

    let token = sessions.issue(username).await;
    info!(username, "login succeeded");
    Ok(token)
}
