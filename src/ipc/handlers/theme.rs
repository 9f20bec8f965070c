use crate::db;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::Theme;
use rusqlite::Connection;
use serde_json::json;
use tracing::warn;

pub const THEME_KEY: &str = "theme";

pub fn stored_theme(conn: &Connection) -> Option<Theme> {
    match db::kv_get(conn, THEME_KEY) {
        Ok(v) => v.as_deref().and_then(Theme::parse),
        Err(e) => {
            warn!(error = %e, "failed to read theme preference");
            None
        }
    }
}

fn effective_theme(state: &AppState, params: &serde_json::Value) -> Theme {
    state.theme.unwrap_or_else(|| {
        if params.get("systemPrefersDark").and_then(|v| v.as_bool()) == Some(true) {
            Theme::Dark
        } else {
            Theme::Light
        }
    })
}

fn theme_get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    Ok(json!({ "theme": effective_theme(state, params).as_str() }))
}

fn theme_set(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let next = if params.get("toggle").and_then(|v| v.as_bool()) == Some(true) {
        effective_theme(state, params).toggled()
    } else {
        let raw = params
            .get("theme")
            .and_then(|v| v.as_str())
            .ok_or_else(|| HandlerErr::bad_params("missing theme"))?;
        Theme::parse(raw).ok_or_else(|| {
            HandlerErr::bad_params("theme must be dark or light")
                .with_details(json!({ "theme": raw }))
        })?
    };

    state.theme = Some(next);
    // Without a workspace the choice lives for this session only.
    if let Some(conn) = state.db.as_ref() {
        if let Err(e) = db::kv_set(conn, THEME_KEY, next.as_str()) {
            warn!(error = %e, "failed to persist theme preference");
        }
    }
    Ok(json!({ "theme": next.as_str() }))
}

fn handle_theme_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, theme_get(state, &req.params))
}

fn handle_theme_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, theme_set(state, &req.params))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "theme.get" => Some(handle_theme_get(state, req)),
        "theme.set" => Some(handle_theme_set(state, req)),
        _ => None,
    }
}
