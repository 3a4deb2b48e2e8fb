use chrono::NaiveDate;
use std::{env, path::PathBuf};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/state.json";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

/// Process configuration read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    /// Dates before this never count as working days.
    pub system_start: NaiveDate,
    /// Seeded as the first admin when the roster is empty.
    pub admin_email: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));

        let system_start = match env::var("APP_SYSTEM_START") {
            Ok(value) => value.parse::<NaiveDate>().unwrap_or_else(|err| {
                warn!("ignoring APP_SYSTEM_START={value:?}: {err}");
                default_system_start()
            }),
            Err(_) => default_system_start(),
        };

        let admin_email = env::var("APP_ADMIN_EMAIL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string());

        Self {
            port,
            data_path,
            system_start,
            admin_email,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            system_start: default_system_start(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
        }
    }
}

pub fn default_system_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 2).unwrap_or(NaiveDate::MIN)
}
