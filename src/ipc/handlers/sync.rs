use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::time::Instant;

fn handle_sync_status(state: &mut AppState, req: &Request) -> serde_json::Value {
    let status = state.sync.poll(Instant::now());
    ok(&req.id, json!(status))
}

fn handle_sync_trigger(state: &mut AppState, req: &Request) -> serde_json::Value {
    let now = Instant::now();
    state.sync.trigger(now);
    let status = state.sync.poll(now);
    ok(&req.id, json!(status))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "sync.status" => Some(handle_sync_status(state, req)),
        "sync.trigger" => Some(handle_sync_trigger(state, req)),
        _ => None,
    }
}
