//! Fixtures shared by the in-tree tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::catalog::Catalog;
use crate::config::{CatalogSettings, LibrarySettings};

/// A minimal mono 16-bit PCM WAV file carrying a RIFF INFO tag.
///
/// `INAM`, `IART` and `IPRD` map to title, artist and album.
pub fn tagged_wav(title: &str, artist: &str, album: &str) -> Vec<u8> {
    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
    fmt.extend_from_slice(&1u16.to_le_bytes()); // mono
    fmt.extend_from_slice(&8_000u32.to_le_bytes());
    fmt.extend_from_slice(&16_000u32.to_le_bytes());
    fmt.extend_from_slice(&2u16.to_le_bytes());
    fmt.extend_from_slice(&16u16.to_le_bytes());

    let mut info = b"INFO".to_vec();
    for (id, value) in [(b"INAM", title), (b"IART", artist), (b"IPRD", album)] {
        if value.is_empty() {
            continue;
        }
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        push_chunk(&mut info, id, &bytes);
    }

    let mut body = b"WAVE".to_vec();
    push_chunk(&mut body, b"fmt ", &fmt);
    push_chunk(&mut body, b"LIST", &info);
    push_chunk(&mut body, b"data", &[0u8; 1_600]);

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

fn push_chunk(out: &mut Vec<u8>, id: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
}

pub fn write_tagged(path: &Path, title: &str, artist: &str, album: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, tagged_wav(title, artist, album)).unwrap();
}

pub fn write_untagged(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"not really audio").unwrap();
}

/// A catalog in its own scratch directory. Keep the `TempDir` alive.
pub fn scratch_catalog() -> (TempDir, Catalog) {
    let dir = tempfile::tempdir().unwrap();
    let settings = CatalogSettings {
        db_path: dir.path().join("catalog").join("towerofsong.db"),
        pool_size: 4,
        busy_timeout_ms: 2_000,
    };
    let catalog = Catalog::open(&settings).unwrap();
    (dir, catalog)
}

/// Library settings indexing the given roots with the default extensions.
pub fn library_settings(roots: &[PathBuf]) -> LibrarySettings {
    LibrarySettings {
        music_folders: roots.to_vec(),
        ..LibrarySettings::default()
    }
}
