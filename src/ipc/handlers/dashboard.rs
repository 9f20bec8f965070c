use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use crate::stats;
use serde_json::json;
use std::time::Instant;

fn handle_dashboard_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    let summary = stats::dashboard(state.store.records(), roster::roster_size());
    let sync = state.sync.poll(Instant::now());
    ok(
        &req.id,
        json!({
            "totalSessions": summary.total_sessions,
            "registeredPupils": summary.registered_pupils,
            "maxSessions": summary.max_sessions,
            "subjectCounts": summary.subjects,
            "sync": sync
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(handle_dashboard_summary(state, req)),
        _ => None,
    }
}
