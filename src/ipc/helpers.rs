use crate::ipc::error::HandlerErr;
use rusqlite::Connection;

pub fn required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| HandlerErr::bad_params(format!("missing {}", key)))
}

pub fn optional_str(params: &serde_json::Value, key: &str) -> Result<Option<String>, HandlerErr> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string", key))),
    }
}

/// Destructive calls only proceed on an explicit `confirmed: true`.
pub fn confirmed(params: &serde_json::Value) -> bool {
    params.get("confirmed").and_then(|v| v.as_bool()) == Some(true)
}

pub fn db_conn(db: Option<&Connection>) -> Result<&Connection, HandlerErr> {
    db.ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}
