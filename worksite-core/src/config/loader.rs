use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::{
    ApiConfig, EndpointsConfig, LoggingConfig, PlatformConfig, RawApiConfig, RawEndpointsConfig,
    RawLoggingConfig, RawPlatformConfig, RawStorageConfig, RawWorksiteConfig, StorageConfig,
    WorksiteConfig,
};
use crate::ConfigError;

/// Env var that relocates the project config directory
pub const PROJECT_CONFIG_DIR_ENV: &str = "WORKSITE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<WorksiteConfig, ConfigError> {
        Self::load_layers(&[worksite_paths::user_config_file(), Self::project_config_path()])
    }

    /// Project config path.
    /// Can be overridden with `WORKSITE_PROJECT_CONFIG_DIR` (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".worksite/config.toml")
        }
    }

    /// Merge the given files in order; later files override earlier ones.
    /// Missing files are skipped.
    pub fn load_layers(paths: &[PathBuf]) -> Result<WorksiteConfig, ConfigError> {
        let mut raw = RawWorksiteConfig::default();

        for path in paths {
            if let Some(layer) = Self::read_layer(path)? {
                debug!("Loaded config layer {}", path.display());
                raw = Self::merge_raw(raw, layer);
            }
        }

        let config = Self::finalize(raw);
        Self::validate(&config)?;
        Ok(config)
    }

    fn read_layer(path: &Path) -> Result<Option<RawWorksiteConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let layer = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(layer))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawWorksiteConfig, overlay: RawWorksiteConfig) -> RawWorksiteConfig {
        RawWorksiteConfig {
            api: RawApiConfig {
                base_url: overlay.api.base_url.or(base.api.base_url),
                endpoints: RawEndpointsConfig {
                    root_folder: overlay
                        .api
                        .endpoints
                        .root_folder
                        .or(base.api.endpoints.root_folder),
                },
            },
            platform: RawPlatformConfig {
                base_url: overlay.platform.base_url.or(base.platform.base_url),
                session_token: overlay
                    .platform
                    .session_token
                    .or(base.platform.session_token),
            },
            storage: RawStorageConfig {
                key_prefix: overlay.storage.key_prefix.or(base.storage.key_prefix),
                dir: overlay.storage.dir.or(base.storage.dir),
            },
            logging: RawLoggingConfig {
                level: overlay.logging.level.or(base.logging.level),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawWorksiteConfig) -> WorksiteConfig {
        let api_defaults = ApiConfig::default();
        let storage_defaults = StorageConfig::default();

        WorksiteConfig {
            api: ApiConfig {
                base_url: raw.api.base_url.unwrap_or(api_defaults.base_url),
                endpoints: EndpointsConfig {
                    root_folder: raw
                        .api
                        .endpoints
                        .root_folder
                        .unwrap_or(api_defaults.endpoints.root_folder),
                },
            },
            platform: PlatformConfig {
                base_url: raw.platform.base_url,
                session_token: raw.platform.session_token,
            },
            storage: StorageConfig {
                key_prefix: raw.storage.key_prefix.unwrap_or(storage_defaults.key_prefix),
                dir: raw.storage.dir,
            },
            logging: LoggingConfig {
                level: raw
                    .logging
                    .level
                    .unwrap_or_else(|| LoggingConfig::default().level),
            },
        }
    }

    fn validate(config: &WorksiteConfig) -> Result<(), ConfigError> {
        let urls = std::iter::once(&config.api.base_url).chain(config.platform.base_url.iter());
        for url in urls {
            url::Url::parse(url).map_err(|e| ConfigError::InvalidBaseUrl {
                url: url.clone(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_layers_yield_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_layers(&[dir.path().join("nope.toml")]).unwrap();
        assert_eq!(config, WorksiteConfig::default());
    }

    #[test]
    fn project_layer_overrides_user_layer() {
        let dir = TempDir::new().unwrap();
        let user = write(
            &dir,
            "user.toml",
            r#"
                [api]
                base_url = "https://user.example.com"

                [logging]
                level = "debug"
            "#,
        );
        let project = write(
            &dir,
            "project.toml",
            r#"
                [api]
                base_url = "https://project.example.com"
            "#,
        );

        let config = ConfigLoader::load_layers(&[user, project]).unwrap();

        assert_eq!(config.api.base_url, "https://project.example.com");
        // Not set by the project layer, so the user value survives
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn endpoint_override_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.toml",
            r#"
                [api.endpoints]
                root_folder = "/adm/config/drive-root"
            "#,
        );

        let config = ConfigLoader::load_layers(&[path]).unwrap();
        assert_eq!(config.api.endpoints.root_folder, "/adm/config/drive-root");
    }

    #[test]
    fn platform_token_survives_overlay_without_one() {
        let dir = TempDir::new().unwrap();
        let user = write(
            &dir,
            "user.toml",
            r#"
                [platform]
                base_url = "https://splunk.example.com:8089"
                session_token = "sess"
            "#,
        );
        let project = write(
            &dir,
            "project.toml",
            r#"
                [platform]
                base_url = "https://splunk.internal:8089"
            "#,
        );

        let config = ConfigLoader::load_layers(&[user, project]).unwrap();
        assert_eq!(
            config.platform.base_url.as_deref(),
            Some("https://splunk.internal:8089")
        );
        assert_eq!(config.platform.session_token.as_deref(), Some("sess"));
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.toml", "[api\nbase_url = 1");

        let err = ConfigLoader::load_layers(&[path]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.toml",
            r#"
                [api]
                base_url = "not a url"
            "#,
        );

        let err = ConfigLoader::load_layers(&[path]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }
}
