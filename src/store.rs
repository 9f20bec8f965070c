use crate::db;
use crate::model::AttendanceRecord;
use rusqlite::Connection;
use tracing::{error, info, warn};

pub const RECORDS_KEY: &str = "attendance_records";

/// Owns the session records, newest first. Every mutation rewrites the
/// whole collection under `RECORDS_KEY`.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: Vec<AttendanceRecord>,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub store: RecordStore,
    pub error: Option<String>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the stored collection. Missing, unreadable, or malformed data
    /// yields an empty store; the reason is logged and returned.
    pub fn load(conn: &Connection) -> LoadOutcome {
        let raw = match db::kv_get(conn, RECORDS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                return LoadOutcome {
                    store: Self::new(),
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to read stored records");
                return LoadOutcome {
                    store: Self::new(),
                    error: Some(e.to_string()),
                };
            }
        };

        match serde_json::from_str::<Vec<AttendanceRecord>>(&raw) {
            Ok(records) => {
                info!(count = records.len(), "loaded attendance records");
                LoadOutcome {
                    store: Self { records },
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "stored records are malformed; starting empty");
                LoadOutcome {
                    store: Self::new(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&AttendanceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Prepends the record. A duplicate id is refused so ids stay unique.
    pub fn add(&mut self, conn: &Connection, record: AttendanceRecord) -> bool {
        if self.contains(&record.id) {
            warn!(id = %record.id, "refusing duplicate record id");
            return false;
        }
        self.records.insert(0, record);
        self.persist(conn);
        true
    }

    /// Returns whether a record was removed. Unknown ids are a no-op and
    /// do not touch storage.
    pub fn remove(&mut self, conn: &Connection, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return false;
        }
        self.persist(conn);
        true
    }

    /// Empties the collection and returns how many records were dropped.
    pub fn clear(&mut self, conn: &Connection) -> usize {
        let removed = self.records.len();
        self.records.clear();
        self.persist(conn);
        removed
    }

    fn persist(&self, conn: &Connection) {
        let json = match serde_json::to_string(&self.records) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "failed to serialize records");
                return;
            }
        };
        if let Err(e) = db::kv_set(conn, RECORDS_KEY, &json) {
            error!(error = %e, "failed to persist records");
        }
    }
}
