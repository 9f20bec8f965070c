mod db;
mod draft;
mod ipc;
mod logging;
mod model;
mod pdf;
mod report;
mod roster;
mod stats;
mod store;
mod sync;

use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};

fn main() {
    logging::init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "attendanced starting");

    let dups = roster::duplicate_pupil_ids();
    if !dups.is_empty() {
        warn!(ids = ?dups, "roster has pupils sharing an id; their attendance is merged");
    }

    let mut state = ipc::AppState::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id; answer anonymously.
                warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    info!("stdin closed; shutting down");
}
