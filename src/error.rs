use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use sqlx::Error as SqlxError;
use std::fmt;
use thiserror::Error as ThisError;
use tracing::error;

use crate::views;

#[derive(Debug, ThisError)]
pub enum RollcallError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("referential error: {0}")]
    Referential(String),

    #[error("authentication error: {0}")]
    Auth(AuthFailure),

    #[error("Database error: {0}")]
    Storage(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("password hashing error: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidCredentials,
    NotAuthenticated,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::InvalidCredentials => f.write_str("invalid credentials"),
            AuthFailure::NotAuthenticated => f.write_str("not authenticated"),
        }
    }
}

impl RollcallError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Message safe to show back on the form that caused the error.
    pub fn user_message(&self) -> String {
        match self {
            RollcallError::Validation(msg) | RollcallError::Referential(msg) => msg.clone(),
            RollcallError::Auth(failure) => failure.to_string(),
            _ => "An internal server error occurred.".to_string(),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RollcallError::Validation(_) | RollcallError::Referential(_)
        )
    }
}

impl IntoResponse for RollcallError {
    fn into_response(self) -> axum::response::Response {
        match self {
            RollcallError::Auth(AuthFailure::NotAuthenticated) => {
                Redirect::to("/").into_response()
            }
            RollcallError::Auth(AuthFailure::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                Html(views::login_page(Some("Invalid username or password"))),
            )
                .into_response(),
            RollcallError::Validation(_) | RollcallError::Referential(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(views::error_page(&self.user_message())),
            )
                .into_response(),
            RollcallError::Storage(_)
            | RollcallError::Io(_)
            | RollcallError::Csv(_)
            | RollcallError::Config(_)
            | RollcallError::InvalidConfig(_)
            | RollcallError::PasswordHash(_) => {
                error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page(&self.user_message())),
                )
                    .into_response()
            }
        }
    }
}
