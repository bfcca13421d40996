pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod views;

pub use config::Config;
pub use db::AttendanceStorage;
pub use error::RollcallError;
pub use router::{RollcallState, rollcall_router};
