use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::handlers::records::record_summary;
use crate::ipc::handlers::settings;
use crate::ipc::helpers::{db_conn, optional_str};
use crate::ipc::types::{AppState, Request};
use crate::pdf;
use crate::report::{self, ReportFilter, YearMonth};
use chrono::Local;
use serde_json::json;
use std::path::PathBuf;
use tracing::warn;

fn parse_filter(params: &serde_json::Value) -> Result<ReportFilter, HandlerErr> {
    let month = match optional_str(params, "month")? {
        Some(m) if !m.trim().is_empty() => Some(YearMonth::parse(&m).map_err(|msg| {
            HandlerErr::bad_params(msg).with_details(json!({ "month": m }))
        })?),
        _ => None,
    };
    let query = optional_str(params, "query")?.unwrap_or_default();
    Ok(ReportFilter { month, query })
}

fn reports_list(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    db_conn(state.db.as_ref())?;
    let filter = parse_filter(params)?;
    let rows: Vec<serde_json::Value> = filter
        .apply(state.store.records())
        .into_iter()
        .map(record_summary)
        .collect();
    Ok(json!({
        "shown": rows.len(),
        "total": state.store.len(),
        "records": rows
    }))
}

fn parse_ids(params: &serde_json::Value) -> Result<Vec<String>, HandlerErr> {
    if let Some(single) = optional_str(params, "recordId")? {
        return Ok(vec![single]);
    }
    let Some(arr) = params.get("ids") else {
        return Ok(Vec::new());
    };
    let arr = arr
        .as_array()
        .ok_or_else(|| HandlerErr::bad_params("ids must be an array"))?;
    arr.iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| HandlerErr::bad_params("ids must contain strings"))
        })
        .collect()
}

fn reports_export_pdf(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = db_conn(state.db.as_ref())?;
    let ids = parse_ids(params)?;
    let selected = report::select_by_ids(state.store.records(), &ids);
    if selected.is_empty() {
        return Err(HandlerErr::new(
            "no_records_selected",
            "select at least one record to export",
        ));
    }

    let title = match optional_str(params, "title")? {
        Some(t) if !t.trim().is_empty() => t,
        _ if params.get("recordId").is_some() => selected[0].date.clone(),
        _ => format!("Batch_{}", Local::now().format("%Y-%m-%d")),
    };

    let out_dir = match optional_str(params, "outDir")? {
        Some(d) if !d.trim().is_empty() => PathBuf::from(d),
        _ => settings::configured_export_dir(conn).unwrap_or_else(|| {
            state
                .workspace
                .as_ref()
                .map(|w| w.join("exports"))
                .unwrap_or_else(|| PathBuf::from("exports"))
        }),
    };

    let summary = pdf::export_records(&selected, &title, &out_dir).map_err(|e| {
        warn!(error = %e, "pdf export failed");
        HandlerErr::new("export_failed", e.to_string())
    })?;
    Ok(json!({
        "path": summary.path.to_string_lossy(),
        "fileName": summary.file_name,
        "pageCount": summary.page_count,
        "recordCount": summary.record_count
    }))
}

fn handle_reports_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, reports_list(state, &req.params))
}

fn handle_reports_export_pdf(state: &mut AppState, req: &Request) -> serde_json::Value {
    respond(&req.id, reports_export_pdf(state, &req.params))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.list" => Some(handle_reports_list(state, req)),
        "reports.exportPdf" => Some(handle_reports_export_pdf(state, req)),
        _ => None,
    }
}
