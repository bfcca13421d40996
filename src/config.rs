use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RollcallError;

/// Password used for the seeded admin when nothing else is configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Runtime configuration, resolved once at startup and passed down explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: String,
    pub loglevel: String,
    /// Key material for the private session cookie. Must be at least 64 bytes;
    /// a random key is generated per process when unset.
    pub cookie_secret: Option<String>,
    pub insecure_cookie: bool,
    pub admin: AdminSeed,
    pub default_events: Vec<EventSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventSeed {
    pub name: String,
    pub frequency_per_month: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:rollcall.db".to_string(),
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            cookie_secret: None,
            insecure_cookie: false,
            admin: AdminSeed::default(),
            default_events: default_event_seeds(),
        }
    }
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

fn default_event_seeds() -> Vec<EventSeed> {
    [
        ("Event A", 4),
        ("Event B", 2),
        ("Event C", 1),
        ("Event D", 1),
        ("Event E", 2),
        ("Event F", 4),
    ]
    .into_iter()
    .map(|(name, frequency_per_month)| EventSeed {
        name: name.to_string(),
        frequency_per_month,
    })
    .collect()
}

impl Config {
    /// Layer defaults, `rollcall.toml` and `ROLLCALL_*` environment variables.
    pub fn load() -> Result<Self, RollcallError> {
        Self::load_from("rollcall.toml")
    }

    pub fn load_from(toml_path: impl AsRef<Path>) -> Result<Self, RollcallError> {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(toml_path.as_ref()))
            .merge(Env::prefixed("ROLLCALL_").split("__"))
            .extract()
            .map_err(Box::new)?;
        Ok(cfg)
    }

    pub fn uses_default_admin_password(&self) -> bool {
        self.admin.password == DEFAULT_ADMIN_PASSWORD
    }
}
