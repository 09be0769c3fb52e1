//! Python package probe and install.
//!
//! Probe = `python -c "import a, b, c"`. On failure the manifest is installed with
//! `python -m pip install -r <manifest>` and the probe runs again.

use std::path::{Path, PathBuf};

use researchflow_core::config::PackageSpec;

use crate::error::BootstrapError;
use crate::process::{CommandSpec, ProcessRunner};

/// Packages that must be importable and the manifest that installs them.
#[derive(Debug, Clone)]
pub struct DependencyProbe {
    pub packages: Vec<PackageSpec>,
    pub manifest: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepsOutcome {
    /// All packages imported on the first probe.
    Satisfied,
    /// Imported after installing the manifest.
    Installed,
    /// No probe configured.
    Skipped,
}

/// `python -c "import a, b"` for all `packages`, output captured.
pub fn probe_command(python: &Path, packages: &[PackageSpec], cwd: &Path) -> CommandSpec {
    let modules: Vec<&str> = packages.iter().map(|p| p.import_name.as_str()).collect();
    CommandSpec::new(python)
        .arg("-c")
        .arg(format!("import {}", modules.join(", ")))
        .current_dir(cwd)
        .captured()
}

/// `python -m pip install -r <manifest>`, output shown to the user.
pub fn install_command(python: &Path, manifest: &Path, cwd: &Path) -> CommandSpec {
    CommandSpec::new(python)
        .args(["-m", "pip", "install", "-r"])
        .arg(manifest.to_string_lossy())
        .current_dir(cwd)
}

/// Manual install instructions printed when automatic installation fails.
pub fn remediation(python: &Path, probe: &DependencyProbe) -> String {
    let dists: Vec<&str> = probe.packages.iter().map(|p| p.dist_name.as_str()).collect();
    format!(
        "Install the dependencies manually, then re-run:\n   {} -m pip install -r {}\n   or: pip install {}",
        python.display(),
        probe.manifest.display(),
        dists.join(" ")
    )
}

fn probe(
    python: &Path,
    packages: &[PackageSpec],
    cwd: &Path,
    runner: &dyn ProcessRunner,
) -> Result<bool, BootstrapError> {
    let spec = probe_command(python, packages, cwd);
    let out = runner
        .run(&spec)
        .map_err(|e| BootstrapError::spawn(&spec.program_name(), e))?;
    if !out.success() {
        tracing::debug!("Import probe failed: {}", out.stderr.trim());
    }
    Ok(out.success())
}

/// Make sure every package imports, installing the manifest once if needed.
pub fn ensure_dependencies(
    deps: &DependencyProbe,
    python: &Path,
    cwd: &Path,
    runner: &dyn ProcessRunner,
) -> Result<DepsOutcome, BootstrapError> {
    if deps.packages.is_empty() {
        return Ok(DepsOutcome::Skipped);
    }
    if probe(python, &deps.packages, cwd, runner)? {
        return Ok(DepsOutcome::Satisfied);
    }

    let failure = || BootstrapError::DependencyInstall {
        packages: deps.packages.iter().map(|p| p.dist_name.clone()).collect(),
        remediation: remediation(python, deps),
    };

    if !deps.manifest.exists() {
        eprintln!("   ✗ Dependency manifest {} not found", deps.manifest.display());
        return Err(failure());
    }

    eprintln!(
        "   📦 Installing dependencies from {} ...",
        deps.manifest.display()
    );
    let spec = install_command(python, &deps.manifest, cwd);
    let installed = match runner.run(&spec) {
        Ok(out) if out.success() => true,
        Ok(out) => {
            eprintln!("   ✗ pip exited with code {}", out.exit_code);
            false
        }
        Err(e) => {
            eprintln!("   ✗ Could not run pip: {}", e);
            false
        }
    };

    if installed && probe(python, &deps.packages, cwd, runner)? {
        return Ok(DepsOutcome::Installed);
    }
    if installed {
        eprintln!("   ✗ Packages still not importable after install");
    }
    Err(failure())
}

/// Probe a single package; used by the doctor for per-package status.
pub fn package_importable(
    python: &Path,
    package: &PackageSpec,
    cwd: &Path,
    runner: &dyn ProcessRunner,
) -> bool {
    let spec = probe_command(python, std::slice::from_ref(package), cwd);
    matches!(runner.run(&spec), Ok(out) if out.success())
}
