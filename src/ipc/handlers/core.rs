use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::{settings, theme};
use crate::ipc::types::{AppState, Request};
use crate::store::RecordStore;
use serde_json::json;
use std::path::PathBuf;
use tracing::{info, warn};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match db::open_db(&path) {
        Ok(conn) => {
            let loaded = RecordStore::load(&conn);
            if let Some(e) = &loaded.error {
                warn!(error = %e, "records could not be restored");
            }
            state.sync = settings::configured_sync_port(&conn);
            if !loaded.store.is_empty() {
                state.sync.mark_synced();
            }
            match (theme::stored_theme(&conn), state.theme) {
                (Some(stored), _) => state.theme = Some(stored),
                // A session choice made before any workspace carries over.
                (None, Some(session)) => {
                    if let Err(e) = db::kv_set(&conn, theme::THEME_KEY, session.as_str()) {
                        warn!(error = %e, "failed to persist theme preference");
                    }
                }
                (None, None) => {}
            }
            state.store = loaded.store;
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            info!(
                workspace = %path.to_string_lossy(),
                records = state.store.len(),
                "workspace opened"
            );

            ok(
                &req.id,
                json!({
                    "workspacePath": path.to_string_lossy(),
                    "recordCount": state.store.len(),
                    "loadError": loaded.error
                }),
            )
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
