//! Gate audit log written while bootstrapping.
//!
//! Kept in its own test binary: the audit path is read from the environment once per process.

use std::fs;
use std::path::PathBuf;

use researchflow_core::config::{
    set_env_var, DependencyConfig, LaunchConfig, ModelConfig, PathsConfig, RuntimeConfig,
};
use researchflow_env::{
    prepare_and_launch, BootstrapPlan, CommandSpec, ProcessOutcome, ProcessRunner,
    RuntimeLocator,
};
use serde_json::Value;
use tempfile::TempDir;

/// Reports the given version and succeeds at everything else.
struct Python(&'static str);

impl ProcessRunner for Python {
    fn run(&self, spec: &CommandSpec) -> std::io::Result<ProcessOutcome> {
        if spec.args.first().map(String::as_str) == Some("--version") {
            return Ok(ProcessOutcome {
                exit_code: 0,
                stdout: format!("Python {}\n", self.0),
                stderr: String::new(),
            });
        }
        Ok(ProcessOutcome::default())
    }
}

struct Locator(bool);

impl RuntimeLocator for Locator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        (self.0 && name == "python3").then(|| PathBuf::from("/usr/bin/python3"))
    }
}

fn plan_for(ws: &TempDir) -> BootstrapPlan {
    for f in ["main.py", "config.py", "check_config.py"] {
        fs::write(ws.path().join(f), "").unwrap();
    }
    BootstrapPlan::from_config(
        &PathsConfig::with_workspace(ws.path().to_path_buf(), "data", "models", "data/kb.json"),
        &RuntimeConfig {
            candidates: vec!["python3".into()],
            min_version: "3.8".into(),
        },
        &DependencyConfig {
            enabled: false,
            packages: Vec::new(),
            requirements: "requirements.txt".into(),
        },
        &ModelConfig {
            enabled: false,
            embedding_model: "all-MiniLM-L6-v2".into(),
            fetch_script: "download_model.py".into(),
            mirror: "https://hf-mirror.com".into(),
        },
        &LaunchConfig {
            entry_point: "main.py".into(),
            config_check: "check_config.py".into(),
            required_files: vec!["config.py".into(), "main.py".into()],
        },
    )
}

#[test]
fn test_audit_log_only_written_once_runtime_resolves() {
    let logs = TempDir::new().unwrap();
    let audit_dir = logs.path().join("audit");
    let audit_file = audit_dir.join("gates.jsonl");
    set_env_var("RESEARCHFLOW_AUDIT_LOG", &audit_file.to_string_lossy());

    let ws = TempDir::new().unwrap();
    let plan = plan_for(&ws);

    let err = prepare_and_launch(&plan, &Python("3.11.2"), &Locator(false)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(!audit_dir.exists());

    let err = prepare_and_launch(&plan, &Python("3.6.9"), &Locator(true)).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(!audit_dir.exists());
    assert!(!ws.path().join("data").exists());

    let report = prepare_and_launch(&plan, &Python("3.11.2"), &Locator(true)).unwrap();
    assert_eq!(report.exit_code, 0);
    let records: Vec<Value> = fs::read_to_string(&audit_file)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let gates: Vec<&str> = records.iter().filter_map(|r| r["gate"].as_str()).collect();
    assert_eq!(gates.first(), Some(&"runtime"));
    assert!(gates.contains(&"seed"));
    assert_eq!(gates.last(), Some(&"launch"));
}
