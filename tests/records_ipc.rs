use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_attendanced");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn attendanced");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_default()
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

fn subject_count(summary: &serde_json::Value, subject: &str) -> u64 {
    summary["subjectCounts"]
        .as_array()
        .expect("subjectCounts")
        .iter()
        .find(|s| s["subject"] == subject)
        .and_then(|s| s["count"].as_u64())
        .expect("subject present")
}

#[test]
fn submitted_record_is_stored_newest_first() {
    let workspace = temp_dir("attendance-records-e2e");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    // Long enough that the sync started by records.create is still pending.
    request_ok(
        &mut stdin,
        &mut reader,
        "1b",
        "settings.update",
        json!({ "section": "sync", "patch": { "mode": "simulated", "delayMs": 10000 } }),
    );

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "records.create",
        json!({
            "date": "2024-05-20",
            "subject": "Sains",
            "teacher": "GRACE ANAK KANA",
            "time": "0700-0800 pm"
        }),
    );
    let first_id = first["record"]["id"].as_str().expect("id").to_string();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "records.create",
        json!({
            "date": "2024-06-01",
            "subject": "Matematik",
            "teacher": "RAFFI BIN SMAIL",
            "time": "0230-0330 pm",
            "attendance": { "1-clararissa-livonia-binti-lehan": true },
            "teachingMaterialLinks": ["https://example.org/fractions", ""]
        }),
    );
    let record = &created["record"];
    assert_eq!(record["attendance"]["1-clararissa-livonia-binti-lehan"], true);
    assert_eq!(record["attendance"].as_object().expect("map").len(), 1);
    assert_eq!(record["teachingMaterialLinks"], json!(["https://example.org/fractions"]));
    let new_id = record["id"].as_str().expect("id").to_string();
    assert_ne!(new_id, first_id);

    let listed = request_ok(&mut stdin, &mut reader, "4", "records.list", json!({}));
    let records = listed["records"].as_array().expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], new_id.as_str());
    assert_eq!(records[1]["id"], first_id.as_str());

    let detail = request_ok(&mut stdin, &mut reader, "5", "records.get", json!({ "id": new_id }));
    assert_eq!(detail["presentCount"], 1);

    let summary = request_ok(&mut stdin, &mut reader, "6", "dashboard.summary", json!({}));
    assert_eq!(summary["totalSessions"], 2);
    assert_eq!(summary["registeredPupils"], 27);
    assert_eq!(subject_count(&summary, "Matematik"), 1);
    assert_eq!(subject_count(&summary, "Sejarah"), 0);
    assert_eq!(summary["sync"]["syncing"], true);

    drop(stdin);
    let _ = child.wait();

    // A fresh process sees the same collection.
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let reopened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(reopened["recordCount"], 2);
    let listed = request_ok(&mut stdin, &mut reader, "2", "records.list", json!({}));
    assert_eq!(listed["records"][0]["id"], new_id.as_str());
    let status = request_ok(&mut stdin, &mut reader, "3", "sync.status", json!({}));
    assert!(status["lastSync"].is_string());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn destructive_calls_need_confirmation() {
    let workspace = temp_dir("attendance-records-confirm");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let a = request_ok(&mut stdin, &mut reader, "2", "records.create", json!({ "subject": "Sejarah" }));
    request_ok(&mut stdin, &mut reader, "3", "records.create", json!({ "subject": "Sejarah" }));
    let a_id = a["record"]["id"].as_str().expect("id").to_string();

    let declined = request_ok(&mut stdin, &mut reader, "4", "records.delete", json!({ "id": a_id }));
    assert_eq!(declined["deleted"], false);
    let listed = request_ok(&mut stdin, &mut reader, "5", "records.list", json!({}));
    assert_eq!(listed["records"].as_array().expect("records").len(), 2);

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "records.delete",
        json!({ "id": a_id, "confirmed": true }),
    );
    assert_eq!(deleted["deleted"], true);
    let again = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "records.delete",
        json!({ "id": a_id, "confirmed": true }),
    );
    assert_eq!(again["deleted"], false);

    let declined = request_ok(&mut stdin, &mut reader, "8", "records.clear", json!({ "confirmed": false }));
    assert_eq!(declined["cleared"], false);

    let cleared = request_ok(&mut stdin, &mut reader, "9", "records.clear", json!({ "confirmed": true }));
    assert_eq!(cleared["removed"], 1);
    let listed = request_ok(&mut stdin, &mut reader, "10", "records.list", json!({}));
    assert!(listed["records"].as_array().expect("records").is_empty());
    let summary = request_ok(&mut stdin, &mut reader, "11", "dashboard.summary", json!({}));
    assert_eq!(summary["totalSessions"], 0);
    for s in summary["subjectCounts"].as_array().expect("counts") {
        assert_eq!(s["count"], 0);
    }

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn invalid_drafts_are_rejected_before_the_store() {
    let workspace = temp_dir("attendance-records-invalid");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let early = request(&mut stdin, &mut reader, "0", "records.list", json!({}));
    assert_eq!(error_code(&early), "no_workspace");

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let bad_teacher = request(
        &mut stdin,
        &mut reader,
        "2",
        "records.create",
        json!({ "teacher": "SOMEONE ELSE" }),
    );
    assert_eq!(error_code(&bad_teacher), "bad_params");
    let bad_date = request(
        &mut stdin,
        &mut reader,
        "3",
        "records.create",
        json!({ "date": "2024-02-30" }),
    );
    assert_eq!(error_code(&bad_date), "bad_params");

    let many_links = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "records.create",
        json!({ "teachingMaterialLinks": ["a", "b", "c", "d", "e"] }),
    );
    assert_eq!(
        many_links["record"]["teachingMaterialLinks"]
            .as_array()
            .expect("links")
            .len(),
        4
    );
    let listed = request_ok(&mut stdin, &mut reader, "5", "records.list", json!({}));
    assert_eq!(listed["records"].as_array().expect("records").len(), 1);

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn malformed_storage_opens_empty() {
    let workspace = temp_dir("attendance-records-malformed");
    let conn = rusqlite::Connection::open(workspace.join("attendance.sqlite3")).expect("open db");
    conn.execute(
        "CREATE TABLE kv_store(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT)",
        [],
    )
    .expect("create kv table");
    conn.execute(
        "INSERT INTO kv_store(key, value) VALUES('attendance_records', '[{\"id\": 1')",
        [],
    )
    .expect("seed garbage");
    drop(conn);

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let opened = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(opened["recordCount"], 0);
    assert!(opened["loadError"].is_string());

    let created = request_ok(&mut stdin, &mut reader, "2", "records.create", json!({}));
    assert!(created["record"]["id"].is_string());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
