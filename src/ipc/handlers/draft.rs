use crate::draft::{today_local, RecordDraft};
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use serde_json::json;

fn draft_json(draft: &RecordDraft) -> serde_json::Value {
    let year_counts: Vec<serde_json::Value> = roster::years()
        .iter()
        .map(|g| {
            json!({
                "year": g.year,
                "present": draft.present_in_year(g.year),
                "total": g.pupils.len()
            })
        })
        .collect();
    json!({
        "date": draft.date,
        "time": draft.time,
        "subject": draft.subject,
        "teacher": draft.teacher,
        "attendance": draft.attendance,
        "teachingMaterialLinks": draft.links,
        "yearCounts": year_counts
    })
}

fn op_index(op: &serde_json::Value) -> Result<usize, HandlerErr> {
    op.get("index")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .ok_or_else(|| HandlerErr::bad_params("op requires a numeric index"))
}

fn apply_op(draft: &mut RecordDraft, op: &serde_json::Value) -> Result<(), HandlerErr> {
    let name = op
        .get("op")
        .and_then(|v| v.as_str())
        .ok_or_else(|| HandlerErr::bad_params("each op needs an op name"))?;
    match name {
        "togglePupil" => {
            let id = op
                .get("id")
                .and_then(|v| v.as_str())
                .ok_or_else(|| HandlerErr::bad_params("togglePupil requires id"))?;
            if !roster::is_known_pupil(id) {
                return Err(HandlerErr::new("not_found", "pupil not on roster")
                    .with_details(json!({ "id": id })));
            }
            draft.toggle_pupil(id);
        }
        "toggleYear" => {
            let year = op
                .get("year")
                .and_then(|v| v.as_u64())
                .filter(|y| (1..=6).contains(y))
                .ok_or_else(|| HandlerErr::bad_params("toggleYear requires year 1..6"))?;
            draft.toggle_year(year as u8);
        }
        "resetAttendance" => draft.reset_attendance(),
        "addLink" => {
            // Silently ignored at the field limit.
            draft.add_link_field();
        }
        "setLink" => {
            let index = op_index(op)?;
            let value = op.get("value").and_then(|v| v.as_str()).unwrap_or("");
            draft.set_link(index, value);
        }
        "removeLink" => draft.remove_link_field(op_index(op)?),
        other => {
            return Err(HandlerErr::bad_params(format!("unknown draft op: {}", other)));
        }
    }
    Ok(())
}

fn draft_edit(params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let empty = json!({});
    let base = params.get("draft").unwrap_or(&empty);
    let mut draft =
        RecordDraft::from_params(base, today_local()).map_err(|m| HandlerErr::bad_params(m))?;

    if let Some(ops) = params.get("ops") {
        let ops = ops
            .as_array()
            .ok_or_else(|| HandlerErr::bad_params("ops must be an array"))?;
        for op in ops {
            apply_op(&mut draft, op)?;
        }
    }
    Ok(json!({ "draft": draft_json(&draft) }))
}

fn handle_draft_edit(_state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, draft_edit(&req.params))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "draft.edit" => Some(handle_draft_edit(state, req)),
        _ => None,
    }
}
