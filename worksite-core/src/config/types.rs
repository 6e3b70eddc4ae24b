use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::DEFAULT_KEY_PREFIX;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_ROOT_FOLDER_PATH: &str = "/adm/system/root-folder";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Final configuration with defaults applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorksiteConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub platform: PlatformConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend REST API location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

/// Endpoint paths that deployments relocate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_root_folder_path")]
    pub root_folder: String,
}

fn default_root_folder_path() -> String {
    DEFAULT_ROOT_FOLDER_PATH.to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            root_folder: default_root_folder_path(),
        }
    }
}

/// Hosting platform that supplies the current user's roles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Management endpoint, e.g. `https://splunk.example.com:8089`.
    /// Unset means roles come from an embedder-supplied provider.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Sent as `Authorization: Splunk <token>`; unset relies on ambient
    /// credentials.
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Local persisted state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Directory for the store file; defaults to the XDG data dir
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `worksite_core=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ==================== Raw (layered) form ====================

/// Config as read from a single file: only explicitly set values are `Some`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawWorksiteConfig {
    #[serde(default)]
    pub api: RawApiConfig,
    #[serde(default)]
    pub platform: RawPlatformConfig,
    #[serde(default)]
    pub storage: RawStorageConfig,
    #[serde(default)]
    pub logging: RawLoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawApiConfig {
    pub base_url: Option<String>,
    #[serde(default)]
    pub endpoints: RawEndpointsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawEndpointsConfig {
    pub root_folder: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawPlatformConfig {
    pub base_url: Option<String>,
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawStorageConfig {
    pub key_prefix: Option<String>,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawLoggingConfig {
    pub level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = WorksiteConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.endpoints.root_folder, "/adm/system/root-folder");
        assert_eq!(config.storage.key_prefix, "admin_portal_");
        assert_eq!(config.logging.level, "info");
        assert!(config.platform.base_url.is_none());
    }

    #[test]
    fn deserialize_partial_toml_fills_defaults() {
        let toml = r#"
            [api]
            base_url = "https://worksite.example.com"
        "#;
        let config: WorksiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://worksite.example.com");
        assert_eq!(config.api.endpoints.root_folder, DEFAULT_ROOT_FOLDER_PATH);
        assert_eq!(config.storage.key_prefix, DEFAULT_KEY_PREFIX);
    }

    #[test]
    fn deserialize_empty_toml() {
        let config: WorksiteConfig = toml::from_str("").unwrap();
        assert_eq!(config, WorksiteConfig::default());
    }
}
