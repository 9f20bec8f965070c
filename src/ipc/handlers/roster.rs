use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::model::{Subject, TIME_SLOTS};
use crate::roster::{self, OFFICIALS, TEACHERS};
use serde_json::json;

fn handle_roster_get(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let subjects: Vec<&str> = Subject::ALL.iter().map(|s| s.as_str()).collect();
    let time_slots: Vec<serde_json::Value> = TIME_SLOTS
        .iter()
        .map(|t| json!({ "id": t.id, "label": t.label }))
        .collect();
    ok(
        &req.id,
        json!({
            "pupils": roster::all_pupils(),
            "years": roster::years(),
            "teachers": TEACHERS,
            "subjects": subjects,
            "timeSlots": time_slots,
            "officials": OFFICIALS
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "roster.get" => Some(handle_roster_get(state, req)),
        _ => None,
    }
}
