use crate::draft::{self, RecordDraft};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{confirmed, db_conn, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceRecord;
use crate::roster;
use crate::stats;
use chrono::Local;
use serde_json::json;
use std::time::Instant;
use tracing::info;

pub fn record_summary(record: &AttendanceRecord) -> serde_json::Value {
    json!({
        "record": record,
        "presentCount": stats::present_count(record),
        "attendanceRate": stats::attendance_rate(record, roster::roster_size()),
        "linkCount": record.teaching_material_links.len()
    })
}

fn records_list(state: &AppState) -> Result<serde_json::Value, HandlerErr> {
    db_conn(state.db.as_ref())?;
    Ok(json!({ "records": state.store.records() }))
}

fn records_get(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    db_conn(state.db.as_ref())?;
    let id = required_str(params, "id")?;
    let record = state
        .store
        .get(&id)
        .ok_or_else(|| HandlerErr::new("not_found", "record not found"))?;
    Ok(record_summary(record))
}

fn records_create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = db_conn(state.db.as_ref())?;
    let draft = RecordDraft::from_params(params, draft::today_local()).map_err(|e| HandlerErr::bad_params(e))?;

    let store = &mut state.store;
    let record = draft.finalize(Local::now(), |id| store.contains(id));
    if !store.add(conn, record.clone()) {
        return Err(HandlerErr::new("db_update_failed", "record id already exists"));
    }
    state.sync.trigger(Instant::now());
    info!(
        id = %record.id,
        subject = record.subject.as_str(),
        present = stats::present_count(&record),
        "record saved"
    );
    Ok(json!({ "record": record }))
}

fn records_delete(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = db_conn(state.db.as_ref())?;
    let id = required_str(params, "id")?;
    if !confirmed(params) {
        return Ok(json!({ "deleted": false, "confirmed": false }));
    }
    let deleted = state.store.remove(conn, &id);
    if deleted {
        state.sync.trigger(Instant::now());
        info!(id = %id, "record deleted");
    }
    Ok(json!({ "deleted": deleted, "confirmed": true }))
}

fn records_clear(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = db_conn(state.db.as_ref())?;
    if !confirmed(params) {
        return Ok(json!({ "cleared": false, "confirmed": false, "removed": 0 }));
    }
    let removed = state.store.clear(conn);
    state.sync.trigger(Instant::now());
    info!(removed, "all records cleared");
    Ok(json!({ "cleared": true, "confirmed": true, "removed": removed }))
}

fn handle_records_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, records_list(state))
}

fn handle_records_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, records_get(state, &req.params))
}

fn handle_records_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, records_create(state, &req.params))
}

fn handle_records_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, records_delete(state, &req.params))
}

fn handle_records_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, records_clear(state, &req.params))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "records.list" => Some(handle_records_list(state, req)),
        "records.get" => Some(handle_records_get(state, req)),
        "records.create" => Some(handle_records_create(state, req)),
        "records.delete" => Some(handle_records_delete(state, req)),
        "records.clear" => Some(handle_records_clear(state, req)),
        _ => None,
    }
}
