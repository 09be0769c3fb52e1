//! Environment variable keys and aliases.
//!
//! Primary keys use the `RESEARCHFLOW_*` prefix. Aliases cover the names the research agent's
//! own scripts already read (`DEEPSEEK_*`, `HF_MIRROR`).

/// Workspace, data and model locations
pub mod paths {
    pub const RESEARCHFLOW_WORKSPACE: &str = "RESEARCHFLOW_WORKSPACE";
    pub const RESEARCHFLOW_DATA_DIR: &str = "RESEARCHFLOW_DATA_DIR";
    pub const RESEARCHFLOW_MODELS_DIR: &str = "RESEARCHFLOW_MODELS_DIR";
    pub const RESEARCHFLOW_KNOWLEDGE_DB: &str = "RESEARCHFLOW_KNOWLEDGE_DB";
}

/// Interpreter resolution
pub mod runtime {
    /// Comma-separated interpreter candidates, tried in order.
    pub const RESEARCHFLOW_PYTHON: &str = "RESEARCHFLOW_PYTHON";
    pub const RESEARCHFLOW_MIN_PYTHON: &str = "RESEARCHFLOW_MIN_PYTHON";
}

/// Python package probe and install
pub mod deps {
    pub const RESEARCHFLOW_SKIP_DEPS: &str = "RESEARCHFLOW_SKIP_DEPS";
    /// Comma-separated `import_name=distribution` pairs; `=distribution` may be omitted.
    pub const RESEARCHFLOW_PACKAGES: &str = "RESEARCHFLOW_PACKAGES";
    pub const RESEARCHFLOW_REQUIREMENTS: &str = "RESEARCHFLOW_REQUIREMENTS";
}

/// Embedding model download
pub mod model {
    pub const RESEARCHFLOW_SKIP_MODEL: &str = "RESEARCHFLOW_SKIP_MODEL";
    pub const RESEARCHFLOW_EMBEDDING_MODEL: &str = "RESEARCHFLOW_EMBEDDING_MODEL";
    pub const EMBEDDING_MODEL_ALIASES: &[&str] = &["EMBEDDING_MODEL"];
    pub const RESEARCHFLOW_MODEL_FETCH: &str = "RESEARCHFLOW_MODEL_FETCH";

    /// Mirror endpoint used only when the first download attempt fails.
    pub const RESEARCHFLOW_MODEL_MIRROR: &str = "RESEARCHFLOW_MODEL_MIRROR";
    pub const MODEL_MIRROR_ALIASES: &[&str] = &["HF_MIRROR"];

    /// Variable the fetcher reads its download endpoint from.
    pub const HF_ENDPOINT: &str = "HF_ENDPOINT";
}

/// Entry point and config check
pub mod launch {
    pub const RESEARCHFLOW_ENTRY: &str = "RESEARCHFLOW_ENTRY";
    pub const RESEARCHFLOW_CONFIG_CHECK: &str = "RESEARCHFLOW_CONFIG_CHECK";
    pub const RESEARCHFLOW_REQUIRED_FILES: &str = "RESEARCHFLOW_REQUIRED_FILES";
}

/// LLM API used by the downstream agent (probed by `researchflow check`)
pub mod llm {
    pub const API_BASE: &str = "RESEARCHFLOW_API_BASE";
    pub const API_BASE_ALIASES: &[&str] = &["DEEPSEEK_BASE_URL", "OPENAI_API_BASE"];

    pub const API_KEY: &str = "RESEARCHFLOW_API_KEY";
    pub const API_KEY_ALIASES: &[&str] = &["DEEPSEEK_API_KEY", "OPENAI_API_KEY"];

    pub const MODEL: &str = "RESEARCHFLOW_MODEL";
    pub const MODEL_ALIASES: &[&str] = &["DEEPSEEK_MODEL"];
}

/// Observability and logging
pub mod observability {
    pub const RESEARCHFLOW_QUIET: &str = "RESEARCHFLOW_QUIET";
    pub const RESEARCHFLOW_LOG_LEVEL: &str = "RESEARCHFLOW_LOG_LEVEL";
    pub const RESEARCHFLOW_LOG_JSON: &str = "RESEARCHFLOW_LOG_JSON";
    pub const RESEARCHFLOW_AUDIT_LOG: &str = "RESEARCHFLOW_AUDIT_LOG";
}
