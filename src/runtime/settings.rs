use tracing::warn;

use crate::config;
use crate::error::Result;

/// Load and validate settings. Unlike presentation options, a broken config
/// is fatal: the process must not serve a catalog it cannot trust.
pub fn load_settings() -> Result<config::Settings> {
    config::Settings::load_validated()
}

/// Startup warnings that need the subscriber to be installed first.
pub fn report(settings: &config::Settings) {
    if settings.library.music_folders.is_empty() {
        warn!("no music folders configured, the catalog will stay empty");
    }
    for root in &settings.library.music_folders {
        if !root.is_dir() {
            warn!(root = %root.display(), "configured music folder is not a directory");
        }
    }
}
