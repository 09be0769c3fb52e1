//! Config structs grouped by concern, loaded from the environment.

use super::env_keys::{deps, launch, llm, model, observability as obv_keys, paths, runtime};
use super::loader::{env_bool, env_list, env_optional, env_or, load_dotenv};
use std::path::{Path, PathBuf};

/// Workspace and the directories/files the bootstrapper manages.
#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub workspace: PathBuf,
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub knowledge_db: PathBuf,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        let workspace = env_optional(paths::RESEARCHFLOW_WORKSPACE, &[])
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        Self::with_workspace(
            workspace,
            &env_or(paths::RESEARCHFLOW_DATA_DIR, &[], || "data".to_string()),
            &env_or(paths::RESEARCHFLOW_MODELS_DIR, &[], || "models".to_string()),
            &env_or(paths::RESEARCHFLOW_KNOWLEDGE_DB, &[], || {
                "data/knowledge_db.json".to_string()
            }),
        )
    }

    /// Build from explicit values. A relative `workspace` resolves against the current
    /// directory; relative entries resolve against `workspace`.
    pub fn with_workspace(
        workspace: PathBuf,
        data_dir: &str,
        models_dir: &str,
        knowledge_db: &str,
    ) -> Self {
        let workspace = absolute(workspace);
        Self {
            data_dir: resolve_in(&workspace, data_dir),
            models_dir: resolve_in(&workspace, models_dir),
            knowledge_db: resolve_in(&workspace, knowledge_db),
            workspace,
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        resolve_in(&self.workspace, path)
    }
}

/// Children run with the workspace as cwd, so it must not depend on ours.
fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            tracing::warn!("Cannot resolve {}: {}", path.display(), e);
            path
        }
    }
}

fn resolve_in(base: &Path, path: &str) -> PathBuf {
    let p = PathBuf::from(path);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

/// Interpreter candidates and the minimum acceptable version.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub candidates: Vec<String>,
    pub min_version: String,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            candidates: env_list(runtime::RESEARCHFLOW_PYTHON, &[], &["python3", "python"]),
            min_version: env_or(runtime::RESEARCHFLOW_MIN_PYTHON, &[], || "3.8".to_string()),
        }
    }
}

/// A Python package: the module name to import and the pip distribution providing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub import_name: String,
    pub dist_name: String,
}

impl PackageSpec {
    pub fn new(import_name: &str, dist_name: &str) -> Self {
        Self {
            import_name: import_name.to_string(),
            dist_name: dist_name.to_string(),
        }
    }
}

const DEFAULT_PACKAGES: &str =
    "sentence_transformers=sentence-transformers,sklearn=scikit-learn,requests,numpy,autogen=pyautogen";

/// Parse `import=dist` pairs separated by commas. A bare name is both import and dist name.
pub fn parse_package_list(raw: &str) -> Vec<PackageSpec> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|entry| match entry.split_once('=') {
            Some((import, dist)) => {
                let (import, dist) = (import.trim(), dist.trim());
                if import.is_empty() {
                    None
                } else if dist.is_empty() {
                    Some(PackageSpec::new(import, import))
                } else {
                    Some(PackageSpec::new(import, dist))
                }
            }
            None => Some(PackageSpec::new(entry, entry)),
        })
        .collect()
}

/// Dependency probe settings.
#[derive(Debug, Clone)]
pub struct DependencyConfig {
    pub enabled: bool,
    pub packages: Vec<PackageSpec>,
    pub requirements: String,
}

impl DependencyConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            enabled: !env_bool(deps::RESEARCHFLOW_SKIP_DEPS, &[], false),
            packages: parse_package_list(&env_or(deps::RESEARCHFLOW_PACKAGES, &[], || {
                DEFAULT_PACKAGES.to_string()
            })),
            requirements: env_or(deps::RESEARCHFLOW_REQUIREMENTS, &[], || {
                "requirements.txt".to_string()
            }),
        }
    }
}

/// Embedding model download settings.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub enabled: bool,
    pub embedding_model: String,
    /// Script run with the interpreter to download the model.
    pub fetch_script: String,
    pub mirror: String,
}

impl ModelConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            enabled: !env_bool(model::RESEARCHFLOW_SKIP_MODEL, &[], false),
            embedding_model: env_or(
                model::RESEARCHFLOW_EMBEDDING_MODEL,
                model::EMBEDDING_MODEL_ALIASES,
                || "all-MiniLM-L6-v2".to_string(),
            ),
            fetch_script: env_or(model::RESEARCHFLOW_MODEL_FETCH, &[], || {
                "download_model.py".to_string()
            }),
            mirror: env_or(
                model::RESEARCHFLOW_MODEL_MIRROR,
                model::MODEL_MIRROR_ALIASES,
                || "https://hf-mirror.com".to_string(),
            ),
        }
    }
}

/// Entry point, config check script and the files that must exist before launch.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub entry_point: String,
    pub config_check: String,
    pub required_files: Vec<String>,
}

impl LaunchConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            entry_point: env_or(launch::RESEARCHFLOW_ENTRY, &[], || "main.py".to_string()),
            config_check: env_or(launch::RESEARCHFLOW_CONFIG_CHECK, &[], || {
                "check_config.py".to_string()
            }),
            required_files: env_list(
                launch::RESEARCHFLOW_REQUIRED_FILES,
                &[],
                &["config.py", "main.py"],
            ),
        }
    }
}

/// LLM API the downstream agent talks to.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        Self {
            api_base: env_or(llm::API_BASE, llm::API_BASE_ALIASES, || {
                "https://api.deepseek.com/v1".to_string()
            }),
            api_key: env_or(llm::API_KEY, llm::API_KEY_ALIASES, String::new),
            model: env_or(llm::MODEL, llm::MODEL_ALIASES, || "deepseek-chat".to_string()),
        }
    }

    /// `None` when no API key is configured.
    pub fn try_from_env() -> Option<Self> {
        let cfg = Self::from_env();
        if cfg.api_key.trim().is_empty() {
            None
        } else {
            Some(cfg)
        }
    }
}

/// quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            load_dotenv();
            Self {
                quiet: env_bool(obv_keys::RESEARCHFLOW_QUIET, &[], false),
                log_level: env_or(obv_keys::RESEARCHFLOW_LOG_LEVEL, &[], || {
                    "researchflow=info".to_string()
                }),
                log_json: env_bool(obv_keys::RESEARCHFLOW_LOG_JSON, &[], false),
                audit_log: env_optional(obv_keys::RESEARCHFLOW_AUDIT_LOG, &[]),
            }
        })
    }
}
