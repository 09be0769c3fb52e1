//! Embedding model download with a single mirror retry.
//!
//! A download that fails twice is not fatal here: the configuration check decides whether
//! the agent can run without the model.

use std::path::Path;

use crate::plan::ModelAsset;
use crate::process::ProcessRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOutcome {
    /// Model directory already present.
    Present,
    /// Downloaded from the default source.
    Fetched,
    /// Downloaded on the retry, through the mirror.
    FetchedFromMirror,
    /// Both attempts failed, or there is no fetch script.
    Unavailable,
    /// No model configured.
    Skipped,
}

/// Download the model if its directory is missing.
///
/// Runs the fetch at most twice: once as configured, once more with the mirror override set.
pub fn ensure_model(
    asset: &ModelAsset,
    python: &Path,
    cwd: &Path,
    runner: &dyn ProcessRunner,
) -> ModelOutcome {
    if asset.dir.exists() {
        return ModelOutcome::Present;
    }

    if let Some(script) = asset.fetch.script_path() {
        if !script.exists() {
            eprintln!(
                "   ⚠ Model fetch script {} not found; skipping download",
                script.display()
            );
            return ModelOutcome::Unavailable;
        }
    }

    let primary = asset.fetch.to_command(python, cwd);
    eprintln!("   📥 Downloading model into {} ...", asset.dir.display());
    match runner.run(&primary) {
        Ok(out) if out.success() => return ModelOutcome::Fetched,
        Ok(out) => eprintln!("   ✗ Download failed (exit code {})", out.exit_code),
        Err(e) => eprintln!("   ✗ Download failed: {}", e),
    }

    let retry = primary.env(asset.mirror.var.clone(), asset.mirror.value.clone());
    eprintln!(
        "   🔁 Retrying with {}={} ...",
        asset.mirror.var, asset.mirror.value
    );
    match runner.run(&retry) {
        Ok(out) if out.success() => ModelOutcome::FetchedFromMirror,
        Ok(out) => {
            eprintln!("   ⚠ Mirror download failed (exit code {})", out.exit_code);
            ModelOutcome::Unavailable
        }
        Err(e) => {
            eprintln!("   ⚠ Mirror download failed: {}", e);
            ModelOutcome::Unavailable
        }
    }
}
