use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

pub(crate) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Lazily walk `root` and yield every regular audio file beneath it.
///
/// An entry that cannot be read (permission denied, vanished mid-walk, symlink
/// loop) is logged and skipped; when it is a directory its whole subtree is
/// skipped and the walk carries on with its siblings.
pub fn audio_files<'a>(
    root: &Path,
    settings: &'a LibrarySettings,
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .follow_links(settings.follow_links)
        .into_iter()
        .filter_entry(move |e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                let at = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                warn!(path = %at, error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(move |entry| entry.file_type().is_file() && is_audio_file(entry.path(), settings))
        .map(walkdir::DirEntry::into_path)
}
