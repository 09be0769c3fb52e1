//! Environment variable loading.
//!
//! Keeps the primary-key → alias fallback chain in one place so callers never repeat
//! `or_else` chains.

use std::env;
use std::path::Path;

/// Load `.env` from the current directory into the process environment, once.
///
/// Variables already present in the environment win over the file.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
    });
}

/// Load `<dir>/.env` without overriding existing variables. A missing file is not an error.
pub fn load_dotenv_from_dir(dir: &Path) {
    let path = dir.join(".env");
    if !path.is_file() {
        return;
    }
    match dotenvy::from_path(&path) {
        Ok(()) => tracing::debug!("Loaded {}", path.display()),
        Err(e) => tracing::warn!("Ignoring malformed {}: {}", path.display(), e),
    }
}

/// Read the primary variable or the first set alias, falling back to `default`.
/// Empty values count as unset.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Read the primary variable or the first alias with a non-blank value.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    std::iter::once(primary)
        .chain(aliases.iter().copied())
        .find_map(|key| {
            let s = env::var(key).ok()?.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Parse a boolean variable: 0/false/no/off are false, anything else set is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(s) => !matches!(
            s.to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

/// Read a comma-separated list, trimming items and dropping empty ones.
pub fn env_list(primary: &str, aliases: &[&str], default: &[&str]) -> Vec<String> {
    match env_optional(primary, aliases) {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

// ─── set_var / remove_var wrappers ──────────────────────────────────────────
//
// SAFETY contract: call only while the process is single-threaded (startup, tests that use
// keys no other test touches).

/// Set one environment variable.
#[allow(unsafe_code)]
pub fn set_env_var(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}

/// Remove one environment variable.
#[allow(unsafe_code)]
pub fn remove_env_var(key: &str) {
    unsafe { env::remove_var(key) };
}

/// RAII guard: removes the variable on drop via [`remove_env_var`].
pub struct ScopedEnvGuard(pub &'static str);

impl ScopedEnvGuard {
    pub fn set(key: &'static str, value: &str) -> Self {
        set_env_var(key, value);
        Self(key)
    }
}

impl Drop for ScopedEnvGuard {
    fn drop(&mut self) {
        remove_env_var(self.0);
    }
}
