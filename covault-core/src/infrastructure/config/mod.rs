mod env;
mod loader;
mod registry;
mod types;

pub use env::{apply_env_overrides, resolve_config_path, resolve_data_dir, API_ADDR_ENV, API_KEY_ENV, CONFIG_PATH_ENV, DATA_DIR_ENV};
pub use loader::{default_app_config, load_app_config, load_app_config_from_path, DEFAULT_CHAIN_KEY};
pub use registry::ChainRegistry;
pub use types::{ApiConfig, AppConfig, ChainConfig, ResolverScheme, RpcSettings};
