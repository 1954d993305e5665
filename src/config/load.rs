use std::{env, path::PathBuf};

use super::schema::Settings;
use crate::error::{Error, Result};

/// Configuration loading helpers.
///
/// `Settings::load` layers environment variables (prefix `TOWEROFSONG__`) over an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> std::result::Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TOWEROFSONG")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("library.music_folders")
                .with_list_parse_key("library.extensions"),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Load and validate. Either failure is fatal at startup.
    pub fn load_validated() -> Result<Self> {
        let settings = Self::load()?;
        settings.validate().map_err(Error::Config)?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.catalog.pool_size == 0 {
            return Err("catalog.pool_size must be >= 1".to_string());
        }
        if self.scan.interval_secs == 0 {
            return Err("scan.interval_secs must be >= 1".to_string());
        }
        if let Some(root) = self.library.music_folders.iter().find(|r| !r.is_absolute()) {
            return Err(format!(
                "library.music_folders entries must be absolute paths, got '{}'",
                root.display()
            ));
        }
        if self
            .library
            .extensions
            .iter()
            .all(|e| e.trim().trim_start_matches('.').is_empty())
        {
            return Err("library.extensions must name at least one extension".to_string());
        }
        if self.auth.username.is_empty() || self.auth.password.is_empty() {
            return Err("auth.username and auth.password must be set".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `TOWEROFSONG_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TOWEROFSONG_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/towerofsong/config.toml`
/// or `~/.config/towerofsong/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("config.toml"))
}

/// `$XDG_DATA_HOME/towerofsong` or `~/.local/share/towerofsong`.
pub fn default_data_dir() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    let base = if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    };

    base.map(|d| d.join("towerofsong"))
}
