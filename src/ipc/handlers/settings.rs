use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::sync::{self, SyncMode, SyncPort, DEFAULT_SYNC_DELAY_MS};
use rusqlite::Connection;
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone, Copy)]
enum SettingsSection {
    Sync,
    Export,
}

impl SettingsSection {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "sync" => Some(Self::Sync),
            "export" => Some(Self::Export),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Sync => "settings.sync",
            Self::Export => "settings.export",
        }
    }
}

fn default_section(section: SettingsSection) -> Value {
    match section {
        SettingsSection::Sync => json!({
            "mode": SyncMode::Simulated.as_str(),
            "delayMs": DEFAULT_SYNC_DELAY_MS
        }),
        SettingsSection::Export => json!({
            "outDir": null
        }),
    }
}

fn parse_u64_range(v: &Value, key: &str, min: u64, max: u64) -> Result<u64, String> {
    let Some(n) = v.as_u64() else {
        return Err(format!("{} must be a non-negative integer", key));
    };
    if n < min || n > max {
        return Err(format!("{} must be between {} and {}", key, min, max));
    }
    Ok(n)
}

fn merge_section_patch(
    section: SettingsSection,
    current: &mut Value,
    patch: &Map<String, Value>,
) -> Result<(), String> {
    let obj = current
        .as_object_mut()
        .ok_or_else(|| "internal settings object must be a JSON object".to_string())?;
    for (k, v) in patch {
        match section {
            SettingsSection::Sync => match k.as_str() {
                "mode" => {
                    let s = v.as_str().ok_or("mode must be a string")?;
                    let mode = SyncMode::parse(s)
                        .ok_or_else(|| "mode must be one of: simulated, off".to_string())?;
                    obj.insert(k.clone(), Value::String(mode.as_str().to_string()));
                }
                "delayMs" => {
                    obj.insert(k.clone(), json!(parse_u64_range(v, k, 0, 10_000)?));
                }
                _ => return Err(format!("unknown sync field: {}", k)),
            },
            SettingsSection::Export => match k.as_str() {
                "outDir" => {
                    if v.is_null() {
                        obj.insert(k.clone(), Value::Null);
                        continue;
                    }
                    let s = v.as_str().ok_or("outDir must be a string or null")?.trim();
                    if s.chars().count() > 1024 {
                        return Err("outDir must be at most 1024 characters".to_string());
                    }
                    if s.is_empty() {
                        obj.insert(k.clone(), Value::Null);
                    } else {
                        obj.insert(k.clone(), Value::String(s.to_string()));
                    }
                }
                _ => return Err(format!("unknown export field: {}", k)),
            },
        }
    }
    Ok(())
}

fn load_section(conn: &Connection, section: SettingsSection) -> anyhow::Result<Value> {
    let mut current = default_section(section);
    if let Some(saved) = db::settings_get_json(conn, section.key())? {
        if let Some(saved_obj) = saved.as_object() {
            // Stale or hand-edited values fall back to defaults.
            if let Err(e) = merge_section_patch(section, &mut current, saved_obj) {
                warn!(section = section.key(), error = %e, "ignoring invalid saved settings");
                current = default_section(section);
            }
        }
    }
    Ok(current)
}

/// Builds the sync port configured for this workspace.
pub fn configured_sync_port(conn: &Connection) -> Box<dyn SyncPort> {
    let cfg = match load_section(conn, SettingsSection::Sync) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "unreadable sync settings; using defaults");
            default_section(SettingsSection::Sync)
        }
    };
    let mode = cfg
        .get("mode")
        .and_then(|v| v.as_str())
        .and_then(SyncMode::parse)
        .unwrap_or(SyncMode::Simulated);
    let delay = cfg
        .get("delayMs")
        .and_then(|v| v.as_u64())
        .unwrap_or(DEFAULT_SYNC_DELAY_MS);
    sync::build_port(mode, Duration::from_millis(delay))
}

pub fn configured_export_dir(conn: &Connection) -> Option<PathBuf> {
    let cfg = match load_section(conn, SettingsSection::Export) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "unreadable export settings; using workspace default");
            return None;
        }
    };
    cfg.get("outDir")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

fn handle_settings_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let sync_cfg = match load_section(conn, SettingsSection::Sync) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    let export_cfg = match load_section(conn, SettingsSection::Export) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    ok(&req.id, json!({ "sync": sync_cfg, "export": export_cfg }))
}

fn handle_settings_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(section_raw) = req.params.get("section").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing section", None);
    };
    let Some(section) = SettingsSection::parse(section_raw) else {
        return err(&req.id, "bad_params", "unknown section", None);
    };
    let Some(patch_obj) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut current = match load_section(conn, section) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = merge_section_patch(section, &mut current, patch_obj) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, section.key(), &current) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }

    if let SettingsSection::Sync = section {
        state.sync = configured_sync_port(conn);
        info!(mode = state.sync.mode().as_str(), "sync port reconfigured");
    }
    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "settings.get" => Some(handle_settings_get(state, req)),
        "settings.update" => Some(handle_settings_update(state, req)),
        _ => None,
    }
}
