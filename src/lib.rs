pub mod app;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod employees;
pub mod errors;
pub mod handlers;
pub mod leaves;
pub mod models;
pub mod notifications;
pub mod reports;
pub mod settings;
pub mod state;
pub mod stats;
pub mod status;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::{load_data, seed_roster};
