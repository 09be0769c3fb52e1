//! `researchflow check`: a read-only report on whether the agent can start.
//!
//! Covers the runtime, each package, LLM API reachability, the embedding model and the
//! knowledge database. Nothing is created or installed.

use std::path::PathBuf;

use researchflow_core::config::{
    DependencyConfig, LlmConfig, ModelConfig, PackageSpec, PathsConfig, RuntimeConfig,
};
use researchflow_core::knowledge;
use serde::Serialize;

use crate::api_probe::{ApiProbe, ApiProbeError};
use crate::deps;
use crate::plan::RuntimeRequirement;
use crate::process::ProcessRunner;
use crate::runtime::{self, RuntimeLocator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
    Skipped,
}

impl CheckStatus {
    fn icon(self) -> &'static str {
        match self {
            CheckStatus::Ok => "✅",
            CheckStatus::Warn => "⚠️ ",
            CheckStatus::Fail => "❌",
            CheckStatus::Skipped => "⏭ ",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckItem {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CheckItem {
    fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    fn print(&self) {
        eprintln!("  {} {}: {}", self.status.icon(), self.name, self.detail);
        if let Some(ref hint) = self.hint {
            eprintln!("     {}", hint);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub runtime: CheckItem,
    pub packages: Vec<CheckItem>,
    pub api: CheckItem,
    pub model: CheckItem,
    pub knowledge: CheckItem,
}

impl DoctorReport {
    fn items(&self) -> impl Iterator<Item = &CheckItem> {
        std::iter::once(&self.runtime)
            .chain(self.packages.iter())
            .chain([&self.api, &self.model, &self.knowledge])
    }

    /// False when the runtime or API check failed. Warnings never fail the report.
    pub fn passed(&self) -> bool {
        self.items().all(|i| i.status != CheckStatus::Fail)
    }

    /// Human-readable report on stderr.
    pub fn print(&self) {
        eprintln!("=== Research agent environment check ===");
        eprintln!();
        eprintln!("1. Python runtime:");
        self.runtime.print();
        eprintln!();
        eprintln!("2. Python packages:");
        for item in &self.packages {
            item.print();
        }
        eprintln!();
        eprintln!("3. LLM API:");
        self.api.print();
        eprintln!();
        eprintln!("4. Embedding model:");
        self.model.print();
        eprintln!();
        eprintln!("5. Knowledge database:");
        self.knowledge.print();
        eprintln!();
        eprintln!("{}", "=".repeat(50));
        if self.passed() {
            eprintln!("✅ Environment check passed; the agent can be started");
        } else {
            eprintln!("❌ Environment check failed; fix the items marked ❌ first");
        }
    }
}

#[derive(Debug, Clone)]
pub struct DoctorOptions {
    pub workspace: PathBuf,
    pub runtime: RuntimeRequirement,
    pub packages: Vec<PackageSpec>,
    pub model_dir: PathBuf,
    pub knowledge_db: PathBuf,
    /// `None` when no API key is configured.
    pub llm: Option<LlmConfig>,
    pub check_api: bool,
}

impl DoctorOptions {
    pub fn from_env(check_api: bool) -> Self {
        let paths = PathsConfig::from_env();
        let runtime = RuntimeConfig::from_env();
        let model = ModelConfig::from_env();
        Self {
            runtime: RuntimeRequirement {
                candidates: runtime.candidates,
                min_version: runtime.min_version,
            },
            packages: DependencyConfig::from_env().packages,
            model_dir: paths.models_dir.join(&model.embedding_model),
            knowledge_db: paths.knowledge_db.clone(),
            llm: LlmConfig::try_from_env(),
            check_api,
            workspace: paths.workspace,
        }
    }
}

pub fn run_doctor(
    opts: &DoctorOptions,
    runner: &dyn ProcessRunner,
    locator: &dyn RuntimeLocator,
    api: &dyn ApiProbe,
) -> DoctorReport {
    let resolved = runtime::resolve_interpreter(
        &opts.runtime.candidates,
        &opts.runtime.min_version,
        locator,
        runner,
    );

    let (runtime, packages) = match resolved {
        Ok(interp) => {
            let version = interp
                .version
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown version".to_string());
            let runtime = CheckItem::new(
                "python",
                CheckStatus::Ok,
                format!("{} ({})", interp.path.display(), version),
            );
            let packages = opts
                .packages
                .iter()
                .map(|pkg| {
                    if deps::package_importable(&interp.path, pkg, &opts.workspace, runner) {
                        CheckItem::new(&pkg.dist_name, CheckStatus::Ok, "installed")
                    } else {
                        CheckItem::new(&pkg.dist_name, CheckStatus::Warn, "not installed")
                            .with_hint(format!("install: pip install {}", pkg.dist_name))
                    }
                })
                .collect();
            (runtime, packages)
        }
        Err(e) => {
            let runtime = CheckItem::new("python", CheckStatus::Fail, e.to_string())
                .with_hint(format!(
                    "install Python {} or newer and make sure it is on PATH",
                    opts.runtime.min_version
                ));
            let packages = opts
                .packages
                .iter()
                .map(|pkg| CheckItem::new(&pkg.dist_name, CheckStatus::Skipped, "no interpreter"))
                .collect();
            (runtime, packages)
        }
    };

    let api = check_api(opts, api);
    let model = if opts.model_dir.exists() {
        CheckItem::new("model", CheckStatus::Ok, format!("{}", opts.model_dir.display()))
    } else {
        CheckItem::new(
            "model",
            CheckStatus::Warn,
            format!("{} not downloaded yet", opts.model_dir.display()),
        )
        .with_hint("it is downloaded on the next `researchflow` launch")
    };
    let knowledge = check_knowledge(opts);

    DoctorReport {
        runtime,
        packages,
        api,
        model,
        knowledge,
    }
}

fn check_api(opts: &DoctorOptions, api: &dyn ApiProbe) -> CheckItem {
    if !opts.check_api {
        return CheckItem::new("api", CheckStatus::Skipped, "skipped (--skip-api)");
    }
    let Some(ref cfg) = opts.llm else {
        return CheckItem::new("api", CheckStatus::Fail, "no API key configured")
            .with_hint("set RESEARCHFLOW_API_KEY (or DEEPSEEK_API_KEY) in the environment or .env");
    };
    match api.probe(cfg) {
        Ok(()) => CheckItem::new(
            "api",
            CheckStatus::Ok,
            format!("{} reachable (model {})", cfg.api_base, cfg.model),
        ),
        Err(e @ ApiProbeError::Status(_)) => CheckItem::new("api", CheckStatus::Fail, e.to_string())
            .with_hint("check that the API key is valid"),
        Err(e @ ApiProbeError::Transport { .. }) => {
            CheckItem::new("api", CheckStatus::Fail, e.to_string())
                .with_hint("check the network connection and RESEARCHFLOW_API_BASE")
        }
    }
}

fn check_knowledge(opts: &DoctorOptions) -> CheckItem {
    if !opts.knowledge_db.exists() {
        return CheckItem::new(
            "knowledge",
            CheckStatus::Warn,
            format!("{} not created yet", opts.knowledge_db.display()),
        )
        .with_hint("run `researchflow seed` to write the default database");
    }
    match knowledge::load_knowledge_db(&opts.knowledge_db) {
        Ok(records) => CheckItem::new(
            "knowledge",
            CheckStatus::Ok,
            format!("{} record(s) in {}", records.len(), opts.knowledge_db.display()),
        ),
        Err(e) => CheckItem::new("knowledge", CheckStatus::Warn, e.to_string()).with_hint(format!(
            "the agent cannot load it; fix or delete {} and run `researchflow seed`",
            opts.knowledge_db.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandSpec, ProcessOutcome};
    use std::path::Path;

    /// `--version` succeeds; `import <missing>` fails.
    struct FakePython {
        missing: Vec<&'static str>,
    }

    impl ProcessRunner for FakePython {
        fn run(&self, spec: &CommandSpec) -> std::io::Result<ProcessOutcome> {
            if spec.args.first().map(String::as_str) == Some("--version") {
                return Ok(ProcessOutcome {
                    exit_code: 0,
                    stdout: "Python 3.11.2\n".into(),
                    stderr: String::new(),
                });
            }
            let code = self
                .missing
                .iter()
                .any(|m| spec.args.iter().any(|a| a == &format!("import {}", m)))
                as i32;
            Ok(ProcessOutcome {
                exit_code: code,
                ..Default::default()
            })
        }
    }

    struct Found(bool);

    impl RuntimeLocator for Found {
        fn locate(&self, name: &str) -> Option<PathBuf> {
            self.0.then(|| PathBuf::from("/usr/bin").join(name))
        }
    }

    struct FixedApi(Option<u16>);

    impl ApiProbe for FixedApi {
        fn probe(&self, _cfg: &LlmConfig) -> Result<(), ApiProbeError> {
            match self.0 {
                None => Ok(()),
                Some(code) => Err(ApiProbeError::Status(code)),
            }
        }
    }

    fn options(root: &Path) -> DoctorOptions {
        DoctorOptions {
            workspace: root.to_path_buf(),
            runtime: RuntimeRequirement {
                candidates: vec!["python3".into()],
                min_version: "3.8".into(),
            },
            packages: vec![
                PackageSpec::new("numpy", "numpy"),
                PackageSpec::new("autogen", "pyautogen"),
            ],
            model_dir: root.join("models").join("all-MiniLM-L6-v2"),
            knowledge_db: root.join("data").join("knowledge_db.json"),
            llm: Some(LlmConfig {
                api_base: "https://api.deepseek.com/v1".into(),
                api_key: "sk-test".into(),
                model: "deepseek-chat".into(),
            }),
            check_api: true,
        }
    }

    #[test]
    fn test_healthy_environment_passes_with_warnings() {
        let tmp = tempfile::TempDir::new().unwrap();
        let runner = FakePython { missing: vec!["autogen"] };
        let report = run_doctor(&options(tmp.path()), &runner, &Found(true), &FixedApi(None));

        assert_eq!(report.runtime.status, CheckStatus::Ok);
        assert_eq!(report.packages[0].status, CheckStatus::Ok);
        assert_eq!(report.packages[1].status, CheckStatus::Warn);
        assert_eq!(
            report.packages[1].hint.as_deref(),
            Some("install: pip install pyautogen")
        );
        assert_eq!(report.model.status, CheckStatus::Warn);
        assert_eq!(report.knowledge.status, CheckStatus::Warn);
        assert!(report.passed());
    }

    #[test]
    fn test_missing_runtime_fails_and_skips_packages() {
        let tmp = tempfile::TempDir::new().unwrap();
        let runner = FakePython { missing: vec![] };
        let report = run_doctor(&options(tmp.path()), &runner, &Found(false), &FixedApi(None));
        assert_eq!(report.runtime.status, CheckStatus::Fail);
        assert!(report
            .packages
            .iter()
            .all(|p| p.status == CheckStatus::Skipped));
        assert!(!report.passed());
    }

    #[test]
    fn test_api_failure_blocks() {
        let tmp = tempfile::TempDir::new().unwrap();
        let runner = FakePython { missing: vec![] };
        let report = run_doctor(&options(tmp.path()), &runner, &Found(true), &FixedApi(Some(401)));
        assert_eq!(report.api.status, CheckStatus::Fail);
        assert!(report.api.detail.contains("401"));
        assert!(!report.passed());
    }

    #[test]
    fn test_missing_key_and_skip_api() {
        let tmp = tempfile::TempDir::new().unwrap();
        let runner = FakePython { missing: vec![] };
        let mut opts = options(tmp.path());
        opts.llm = None;
        let report = run_doctor(&opts, &runner, &Found(true), &FixedApi(None));
        assert_eq!(report.api.status, CheckStatus::Fail);

        opts.check_api = false;
        let report = run_doctor(&opts, &runner, &Found(true), &FixedApi(None));
        assert_eq!(report.api.status, CheckStatus::Skipped);
        assert!(report.passed());
    }

    #[test]
    fn test_knowledge_db_states() {
        let tmp = tempfile::TempDir::new().unwrap();
        let opts = options(tmp.path());
        std::fs::create_dir_all(opts.knowledge_db.parent().unwrap()).unwrap();
        let runner = FakePython { missing: vec![] };

        std::fs::write(&opts.knowledge_db, knowledge::default_knowledge_db()).unwrap();
        let report = run_doctor(&opts, &runner, &Found(true), &FixedApi(None));
        assert_eq!(report.knowledge.status, CheckStatus::Ok);
        assert!(report.knowledge.detail.starts_with("1 record(s)"));

        std::fs::write(&opts.knowledge_db, "not json").unwrap();
        let report = run_doctor(&opts, &runner, &Found(true), &FixedApi(None));
        assert_eq!(report.knowledge.status, CheckStatus::Warn);
        assert!(report.knowledge.hint.is_some());
        assert!(report.passed());
    }

    #[test]
    fn test_report_serializes_statuses_lowercase() {
        let tmp = tempfile::TempDir::new().unwrap();
        let runner = FakePython { missing: vec![] };
        let report = run_doctor(&options(tmp.path()), &runner, &Found(true), &FixedApi(None));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["runtime"]["status"], "ok");
        assert_eq!(json["model"]["status"], "warn");
        assert!(json["runtime"].get("hint").is_none());
    }
}
