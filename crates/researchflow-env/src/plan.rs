//! BootstrapPlan: everything `prepare_and_launch` needs, resolved to concrete paths.

use std::path::{Path, PathBuf};

use researchflow_core::config::{
    env_keys, DependencyConfig, LaunchConfig, ModelConfig, PathsConfig, RuntimeConfig,
};
use researchflow_core::knowledge;

use crate::deps::DependencyProbe;
use crate::process::CommandSpec;

/// A program to run, either a script for the resolved interpreter or a standalone executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Script { script: PathBuf, args: Vec<String> },
    Program { program: PathBuf, args: Vec<String> },
}

impl Invocation {
    pub fn script(script: impl Into<PathBuf>) -> Self {
        Invocation::Script {
            script: script.into(),
            args: Vec::new(),
        }
    }

    /// Build the command, running scripts with `python`, in `cwd`.
    pub fn to_command(&self, python: &Path, cwd: &Path) -> CommandSpec {
        let spec = match self {
            Invocation::Script { script, args } => CommandSpec::new(python)
                .arg(script.to_string_lossy())
                .args(args.iter().cloned()),
            Invocation::Program { program, args } => {
                CommandSpec::new(program.clone()).args(args.iter().cloned())
            }
        };
        spec.current_dir(cwd)
    }

    /// The script path, when this is a script invocation.
    pub fn script_path(&self) -> Option<&Path> {
        match self {
            Invocation::Script { script, .. } => Some(script),
            Invocation::Program { .. } => None,
        }
    }
}

/// Interpreter candidates and minimum version.
#[derive(Debug, Clone)]
pub struct RuntimeRequirement {
    pub candidates: Vec<String>,
    pub min_version: String,
}

/// Seed file written once when absent.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub path: PathBuf,
    pub default_contents: String,
}

/// Environment override applied to the single model-fetch retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOverride {
    pub var: String,
    pub value: String,
}

/// Local model directory and how to fetch it.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub dir: PathBuf,
    pub fetch: Invocation,
    pub mirror: MirrorOverride,
}

#[derive(Debug, Clone)]
pub struct BootstrapPlan {
    /// Working directory for every child process.
    pub workspace: PathBuf,
    pub runtime: RuntimeRequirement,
    pub required_dirs: Vec<PathBuf>,
    pub seed: Option<SeedData>,
    pub dependency_probe: Option<DependencyProbe>,
    pub model: Option<ModelAsset>,
    pub required_files: Vec<PathBuf>,
    pub config_check: Option<Invocation>,
    pub entry_point: Invocation,
}

impl BootstrapPlan {
    /// Plan for the research agent, configured from the environment.
    pub fn from_env() -> Self {
        Self::from_config(
            &PathsConfig::from_env(),
            &RuntimeConfig::from_env(),
            &DependencyConfig::from_env(),
            &ModelConfig::from_env(),
            &LaunchConfig::from_env(),
        )
    }

    pub fn from_config(
        paths: &PathsConfig,
        runtime: &RuntimeConfig,
        deps: &DependencyConfig,
        model: &ModelConfig,
        launch: &LaunchConfig,
    ) -> Self {
        let dependency_probe = deps.enabled.then(|| DependencyProbe {
            packages: deps.packages.clone(),
            manifest: paths.resolve(&deps.requirements),
        });

        let model = model.enabled.then(|| ModelAsset {
            dir: paths.models_dir.join(&model.embedding_model),
            fetch: Invocation::script(paths.resolve(&model.fetch_script)),
            mirror: MirrorOverride {
                var: env_keys::model::HF_ENDPOINT.to_string(),
                value: model.mirror.clone(),
            },
        });

        Self {
            workspace: paths.workspace.clone(),
            runtime: RuntimeRequirement {
                candidates: runtime.candidates.clone(),
                min_version: runtime.min_version.clone(),
            },
            required_dirs: vec![paths.data_dir.clone(), paths.models_dir.clone()],
            seed: Some(SeedData {
                path: paths.knowledge_db.clone(),
                default_contents: knowledge::default_knowledge_db().to_string(),
            }),
            dependency_probe,
            model,
            required_files: launch
                .required_files
                .iter()
                .map(|f| paths.resolve(f))
                .collect(),
            config_check: Some(Invocation::script(paths.resolve(&launch.config_check))),
            entry_point: Invocation::script(paths.resolve(&launch.entry_point)),
        }
    }
}
