//! The bootstrap sequence.
//!
//! Flow:
//!   1. Resolve the Python interpreter (fatal if missing or too old)
//!   2. Ensure data/model directories
//!   3. Write the seed knowledge database if absent
//!   4. Probe packages, install the manifest on failure (fatal if that fails)
//!   5. Download the embedding model if absent, one mirror retry (never fatal)
//!   6. Check required files (fatal)
//!   7. Run the configuration check (fatal on non-zero)
//!   then launch the entry point and pass its exit status through.
//!
//! Nothing created along the way is rolled back on failure; every step is idempotent.

use std::path::PathBuf;

use researchflow_core::observability::audit_gate;
use researchflow_fs::{DirStatus, WriteStatus};
use serde_json::json;

use crate::deps::{self, DepsOutcome};
use crate::error::BootstrapError;
use crate::info_log;
use crate::model::{self, ModelOutcome};
use crate::plan::BootstrapPlan;
use crate::process::ProcessRunner;
use crate::runtime::{self, ResolvedInterpreter, RuntimeLocator};

/// Directories and seed file state after [`ensure_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutReport {
    pub dirs: Vec<(PathBuf, DirStatus)>,
    /// `None` when the plan has no seed file.
    pub seed: Option<WriteStatus>,
}

#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub interpreter: ResolvedInterpreter,
    pub layout: LayoutReport,
    pub deps: DepsOutcome,
    pub model: ModelOutcome,
    /// The entry point's exit status.
    pub exit_code: i32,
}

/// Numbered progress lines on stderr.
struct Steps {
    current: usize,
    total: usize,
}

impl Steps {
    fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    fn start(&mut self, icon: &str, msg: &str) {
        self.current += 1;
        eprintln!("{} Step {}/{}: {}", icon, self.current, self.total, msg);
    }
}

/// Record a fatal gate failure in the audit log and on stderr, then hand the error back.
fn fail(gate: &str, err: BootstrapError) -> BootstrapError {
    audit_gate(
        gate,
        "failed",
        json!({ "kind": err.kind(), "error": err.to_string() }),
    );
    report(err)
}

/// Print a fatal failure with its remediation.
fn report(err: BootstrapError) -> BootstrapError {
    eprintln!("   ❌ {}", err);
    match &err {
        BootstrapError::MissingRequiredFile { missing, .. } if missing.len() > 1 => {
            for path in missing {
                eprintln!("      • {}", path.display());
            }
        }
        BootstrapError::DependencyInstall { remediation, .. } => {
            eprintln!("   {}", remediation);
        }
        BootstrapError::ConfigValidation { .. } => {
            eprintln!("   Fix the problems reported above, then run again.");
        }
        _ => {}
    }
    err
}

/// Ensure the plan's directories and seed file. Idempotent and never touches an existing seed.
pub fn ensure_layout(plan: &BootstrapPlan) -> Result<LayoutReport, BootstrapError> {
    let mut steps = Steps::new(2);
    ensure_layout_steps(plan, &mut steps)
}

fn ensure_layout_steps(
    plan: &BootstrapPlan,
    steps: &mut Steps,
) -> Result<LayoutReport, BootstrapError> {
    steps.start("📁", "Ensuring directories...");
    let dirs =
        researchflow_fs::ensure_dirs(&plan.required_dirs).map_err(|e| fail("dirs", e.into()))?;
    for (path, status) in &dirs {
        match status {
            DirStatus::Created => eprintln!("   ✓ Created {}", path.display()),
            DirStatus::Existed => info_log!("{} already exists", path.display()),
        }
    }
    audit_gate(
        "dirs",
        "ok",
        json!({
            "created": dirs
                .iter()
                .filter(|(_, s)| *s == DirStatus::Created)
                .map(|(p, _)| p.display().to_string())
                .collect::<Vec<_>>()
        }),
    );

    steps.start("📄", "Ensuring knowledge database...");
    let seed = match plan.seed {
        Some(ref seed) => {
            let status = researchflow_fs::write_if_absent(
                &seed.path,
                seed.default_contents.as_bytes(),
            )
            .map_err(|e| fail("seed", e.into()))?;
            match status {
                WriteStatus::Created => {
                    eprintln!("   ✓ Wrote default knowledge database to {}", seed.path.display())
                }
                WriteStatus::AlreadyExists => {
                    eprintln!("   ✓ {} already exists, leaving it untouched", seed.path.display())
                }
            }
            audit_gate(
                "seed",
                match status {
                    WriteStatus::Created => "created",
                    WriteStatus::AlreadyExists => "exists",
                },
                json!({ "path": seed.path.display().to_string() }),
            );
            Some(status)
        }
        None => {
            eprintln!("   ⏭ No seed file configured");
            None
        }
    };

    Ok(LayoutReport { dirs, seed })
}

/// Bring the environment up to the plan, then run the entry point.
///
/// Returns the report, whose `exit_code` is the entry point's status. Any fatal gate stops
/// the sequence before the entry point runs.
pub fn prepare_and_launch(
    plan: &BootstrapPlan,
    runner: &dyn ProcessRunner,
    locator: &dyn RuntimeLocator,
) -> Result<BootstrapReport, BootstrapError> {
    let mut steps = Steps::new(7);
    let cwd = plan.workspace.as_path();

    // 1. Interpreter. A failure here leaves the filesystem untouched, audit log included.
    steps.start("🔍", "Checking Python runtime...");
    let interpreter = runtime::resolve_interpreter(
        &plan.runtime.candidates,
        &plan.runtime.min_version,
        locator,
        runner,
    )
    .map_err(|e| {
        tracing::warn!("Runtime gate failed: {}", e);
        report(e)
    })?;
    eprintln!(
        "   ✓ {} ({})",
        interpreter.path.display(),
        interpreter
            .version
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown version".to_string())
    );
    audit_gate(
        "runtime",
        "ok",
        json!({
            "path": interpreter.path.display().to_string(),
            "version": interpreter.version.map(|v| v.to_string()),
        }),
    );
    let python = interpreter.path.as_path();

    // 2-3. Directories and seed data.
    let layout = ensure_layout_steps(plan, &mut steps)?;

    // 4. Packages.
    steps.start("📦", "Checking Python dependencies...");
    let deps = match plan.dependency_probe {
        Some(ref probe) => deps::ensure_dependencies(probe, python, cwd, runner)
            .map_err(|e| fail("deps", e))?,
        None => DepsOutcome::Skipped,
    };
    match deps {
        DepsOutcome::Satisfied => eprintln!("   ✓ All packages importable"),
        DepsOutcome::Installed => eprintln!("   ✓ Packages installed"),
        DepsOutcome::Skipped => eprintln!("   ⏭ Skipped"),
    }
    audit_gate("deps", "ok", json!({ "outcome": deps }));

    // 5. Model, never fatal.
    steps.start("🧠", "Checking embedding model...");
    let model = match plan.model {
        Some(ref asset) => model::ensure_model(asset, python, cwd, runner),
        None => ModelOutcome::Skipped,
    };
    match model {
        ModelOutcome::Present => eprintln!("   ✓ Model already downloaded"),
        ModelOutcome::Fetched | ModelOutcome::FetchedFromMirror => {
            eprintln!("   ✓ Model downloaded")
        }
        ModelOutcome::Unavailable => {
            eprintln!("   ⚠ Model unavailable; the configuration check decides whether to continue")
        }
        ModelOutcome::Skipped => eprintln!("   ⏭ Skipped"),
    }
    audit_gate(
        "model",
        if model == ModelOutcome::Unavailable {
            "unavailable"
        } else {
            "ok"
        },
        json!({ "outcome": model }),
    );

    // 6. Required files.
    steps.start("🗂 ", "Checking required files...");
    let missing = researchflow_fs::missing_paths(&plan.required_files);
    if let Some(first) = missing.first() {
        return Err(fail(
            "files",
            BootstrapError::MissingRequiredFile {
                path: first.clone(),
                missing: missing.clone(),
            },
        ));
    }
    eprintln!("   ✓ {} file(s) present", plan.required_files.len());
    audit_gate("files", "ok", json!({ "count": plan.required_files.len() }));

    // 7. Configuration check.
    steps.start("🩺", "Running configuration check...");
    match plan.config_check {
        Some(ref check) => {
            let spec = check.to_command(python, cwd);
            let out = runner
                .run(&spec)
                .map_err(|e| fail("config_check", BootstrapError::spawn(&spec.to_string(), e)))?;
            if !out.success() {
                return Err(fail(
                    "config_check",
                    BootstrapError::ConfigValidation {
                        exit_code: out.exit_code,
                    },
                ));
            }
            eprintln!("   ✓ Configuration check passed");
            audit_gate("config_check", "ok", json!({}));
        }
        None => eprintln!("   ⏭ Skipped"),
    }

    // Launch.
    let spec = plan.entry_point.to_command(python, cwd).foreground();
    eprintln!();
    eprintln!("🚀 Launching {} ...", spec);
    eprintln!();
    let out = runner
        .run(&spec)
        .map_err(|e| fail("launch", BootstrapError::spawn(&spec.to_string(), e)))?;
    audit_gate("launch", "exited", json!({ "exit_code": out.exit_code }));
    if !out.success() {
        tracing::warn!("Entry point exited with code {}", out.exit_code);
    }

    Ok(BootstrapReport {
        interpreter,
        layout,
        deps,
        model,
        exit_code: out.exit_code,
    })
}
