//! XDG Base Directory paths for the worksite client.
//!
//! The config loader reads from [`config_dir`] and the file-backed local
//! store writes under [`data_dir`].

use std::path::PathBuf;

const APP_DIR: &str = "worksite";

/// `$<env_var>/worksite`, else `~/<home_relative>/worksite`, else the
/// relative path when there is no home directory.
fn xdg_app_dir(env_var: &str, home_relative: &str) -> PathBuf {
    let root = match std::env::var_os(env_var) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .map(|home| home.join(home_relative))
            .unwrap_or_else(|| PathBuf::from(home_relative)),
    };
    root.join(APP_DIR)
}

/// Directory holding `config.toml`: `$XDG_CONFIG_HOME/worksite` or
/// `~/.config/worksite`.
///
/// ```
/// let config_file = worksite_paths::config_dir().join("config.toml");
/// assert!(config_file.ends_with("worksite/config.toml"));
/// ```
pub fn config_dir() -> PathBuf {
    xdg_app_dir("XDG_CONFIG_HOME", ".config")
}

/// Where the file-backed store keeps the token, selected site and drafts:
/// `$XDG_DATA_HOME/worksite` or `~/.local/share/worksite`.
pub fn data_dir() -> PathBuf {
    xdg_app_dir("XDG_DATA_HOME", ".local/share")
}

pub fn user_config_file() -> PathBuf {
    config_dir().join("config.toml")
}
