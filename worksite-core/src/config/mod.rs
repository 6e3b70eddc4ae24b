//! Layered TOML configuration

mod loader;
mod types;

pub use loader::{ConfigLoader, PROJECT_CONFIG_DIR_ENV};
pub use types::{
    ApiConfig, DEFAULT_BASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_ROOT_FOLDER_PATH, EndpointsConfig,
    LoggingConfig, PlatformConfig, StorageConfig, WorksiteConfig,
};
