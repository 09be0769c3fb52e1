//! Observability: tracing init and the gate audit log.
//!
//! Uses config::ObservabilityConfig for RESEARCHFLOW_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{json, Value};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing. Call at process startup.
/// When RESEARCHFLOW_QUIET=1 only WARN and above are logged. Logs go to stderr so stdout stays
/// free for machine-readable output.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "researchflow=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    };
}

/// True when RESEARCHFLOW_QUIET is set.
pub fn is_quiet() -> bool {
    ObservabilityConfig::from_env().quiet
}

fn get_audit_path() -> Option<String> {
    {
        let guard = AUDIT_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = ObservabilityConfig::from_env().audit_log.clone()?;
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = AUDIT_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn append_jsonl(path: &Path, record: &Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn gate_record(gate: &str, status: &str, detail: Value) -> Value {
    json!({
        "ts": now(),
        "event": "gate",
        "gate": gate,
        "status": status,
        "detail": detail,
    })
}

fn process_record(program: &str, args: &[String], exit_code: i32, duration_ms: u64) -> Value {
    json!({
        "ts": now(),
        "event": "process_exited",
        "program": program,
        "args": args,
        "exit_code": exit_code,
        "duration_ms": duration_ms,
        "success": exit_code == 0,
    })
}

/// Audit: one bootstrap gate finished (`status` is e.g. "ok", "created", "failed").
pub fn audit_gate(gate: &str, status: &str, detail: Value) {
    if let Some(path) = get_audit_path() {
        append_jsonl(Path::new(&path), &gate_record(gate, status, detail));
    }
}

/// Audit: a child process exited.
pub fn audit_process_exited(program: &str, args: &[String], exit_code: i32, duration_ms: u64) {
    if let Some(path) = get_audit_path() {
        append_jsonl(
            Path::new(&path),
            &process_record(program, args, exit_code, duration_ms),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_record_shape() {
        let rec = gate_record("seed", "created", json!({ "path": "data/kb.json" }));
        assert_eq!(rec["event"], "gate");
        assert_eq!(rec["gate"], "seed");
        assert_eq!(rec["status"], "created");
        assert_eq!(rec["detail"]["path"], "data/kb.json");
        assert!(rec["ts"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_append_jsonl_appends_lines() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("audit.jsonl");
        append_jsonl(&path, &gate_record("dirs", "ok", json!({})));
        append_jsonl(
            &path,
            &process_record("python3", &["main.py".to_string()], 3, 12),
        );

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["gate"], "dirs");
        assert_eq!(lines[1]["event"], "process_exited");
        assert_eq!(lines[1]["exit_code"], 3);
        assert_eq!(lines[1]["success"], false);
    }
}
