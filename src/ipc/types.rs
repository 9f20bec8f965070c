use crate::model::Theme;
use crate::store::RecordStore;
use crate::sync::{self, SyncMode, SyncPort, DEFAULT_SYNC_DELAY_MS};
use rusqlite::Connection;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the daemon owns between requests. Views get copies of
/// this data in responses; only handlers mutate it.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub store: RecordStore,
    pub theme: Option<Theme>,
    pub sync: Box<dyn SyncPort>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            db: None,
            store: RecordStore::new(),
            theme: None,
            sync: sync::build_port(
                SyncMode::Simulated,
                Duration::from_millis(DEFAULT_SYNC_DELAY_MS),
            ),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
