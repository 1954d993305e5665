use std::path::PathBuf;

use serde::Deserialize;

use super::load::default_data_dir;

/// Top-level server settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/towerofsong/config.toml` or `~/.config/towerofsong/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `TOWEROFSONG__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub catalog: CatalogSettings,
    pub scan: ScanSettings,
    pub auth: AuthSettings,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Root directories to index, walked in order.
    pub music_folders: Vec<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning. Off by default so a
    /// linked directory is not catalogued twice under two paths.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            music_folders: Vec::new(),
            extensions: vec!["mp3".into(), "flac".into(), "wav".into()],
            follow_links: false,
            include_hidden: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// SQLite database file. Parent directories are created on open.
    pub db_path: PathBuf,
    /// Maximum number of pooled connections shared by readers and the scanner.
    pub pool_size: u32,
    /// How long a connection waits on a locked database (milliseconds).
    pub busy_timeout_ms: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            db_path: default_data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("towerofsong.db"),
            pool_size: 4,
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Seconds between two synchronization passes.
    pub interval_secs: u64,
    /// Run a pass as soon as the scheduler starts.
    pub on_startup: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            interval_secs: 24 * 60 * 60,
            on_startup: true,
        }
    }
}

/// The single shared credential pair accepted by `login`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}
