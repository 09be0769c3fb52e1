//! researchflow configuration layer
//!
//! Every environment variable read goes through this module; callers use the structured
//! configs instead of `std::env::var`.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `env_list` helpers and `.env` loading
//! - `schema`: `PathsConfig`, `RuntimeConfig`, `DependencyConfig`, `ModelConfig`, ...
//! - `env_keys`: key constants and their aliases

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{
    env_bool, env_list, env_optional, env_or, load_dotenv, load_dotenv_from_dir, remove_env_var,
    set_env_var, ScopedEnvGuard,
};
pub use schema::{
    parse_package_list, DependencyConfig, LaunchConfig, LlmConfig, ModelConfig,
    ObservabilityConfig, PackageSpec, PathsConfig, RuntimeConfig,
};
