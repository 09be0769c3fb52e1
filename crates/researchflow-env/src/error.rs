//! Fatal bootstrap failures and their process exit codes.
//!
//! A failed model download is not here: it is reported as `ModelOutcome::Unavailable` and
//! left for the configuration check to judge. A failing entry point is not an error either;
//! its status is passed through unchanged.

use std::path::PathBuf;

use researchflow_fs::FsError;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("{runtime} not found (requires version {min_version} or newer){}", found_suffix(.found))]
    MissingRuntime {
        runtime: String,
        min_version: String,
        found: Option<String>,
    },

    #[error("required file missing: {}", .path.display())]
    MissingRequiredFile { path: PathBuf, missing: Vec<PathBuf> },

    #[error("dependency installation failed for: {}", .packages.join(", "))]
    DependencyInstall {
        packages: Vec<String>,
        remediation: String,
    },

    #[error("configuration check failed (exit code {exit_code})")]
    ConfigValidation { exit_code: i32 },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

fn found_suffix(found: &Option<String>) -> String {
    match found {
        Some(v) => format!("; found {}", v),
        None => String::new(),
    }
}

impl BootstrapError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::Fs(_) | BootstrapError::Spawn { .. } => 1,
            BootstrapError::MissingRuntime { .. } => 2,
            BootstrapError::MissingRequiredFile { .. } => 3,
            BootstrapError::DependencyInstall { .. } => 4,
            BootstrapError::ConfigValidation { .. } => 5,
        }
    }

    /// Short stable name, used in audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            BootstrapError::MissingRuntime { .. } => "missing_runtime",
            BootstrapError::MissingRequiredFile { .. } => "missing_required_file",
            BootstrapError::DependencyInstall { .. } => "dependency_install",
            BootstrapError::ConfigValidation { .. } => "config_validation",
            BootstrapError::Spawn { .. } => "spawn",
            BootstrapError::Fs(_) => "filesystem",
        }
    }

    pub(crate) fn spawn(program: &str, source: std::io::Error) -> Self {
        BootstrapError::Spawn {
            program: program.to_string(),
            source,
        }
    }
}
