use crate::calendar::WorkCalendar;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{AppData, Notification};
use crate::storage::persist_data;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::{Mutex, broadcast};
use tracing::debug;

const EVENT_BUFFER: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    /// Session token -> employee id.
    pub sessions: Arc<Mutex<HashMap<String, String>>>,
    pub events: broadcast::Sender<Notification>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, data: AppData) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            data_path: config.data_path.clone(),
            data: Arc::new(Mutex::new(data)),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            events,
            config: Arc::new(config),
        }
    }

    pub fn calendar(&self, data: &AppData) -> WorkCalendar {
        WorkCalendar::new(&data.settings, self.config.system_start)
    }

    pub async fn persist(&self, data: &AppData) -> Result<(), AppError> {
        persist_data(&self.data_path, data).await
    }

    /// Fans a notification out to live listeners. No listeners is fine.
    pub fn publish(&self, notification: Notification) {
        if let Err(err) = self.events.send(notification) {
            debug!("no live listeners: {err}");
        }
    }
}
