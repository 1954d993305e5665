use std::fmt;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use super::tags::UNKNOWN;

/// Catalog identifier, assigned once at first insertion and never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TrackId(i64);

impl TrackId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TrackId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// One catalogued audio file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    pub id: TrackId,
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// User state; never touched by a synchronization pass.
    pub favourited: bool,
}

/// Best-effort tag data for a file. Every field is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl TrackMetadata {
    /// Fill missing fields: the file name for `title`, `"Unknown"` otherwise.
    pub fn with_defaults(
        path: &Path,
        title: Option<String>,
        artist: Option<String>,
        album: Option<String>,
    ) -> Self {
        Self {
            title: title.unwrap_or_else(|| file_name(path)),
            artist: artist.unwrap_or_else(|| UNKNOWN.to_string()),
            album: album.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    pub fn fallback(path: &Path) -> Self {
        Self::with_defaults(path, None, None, None)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| path.display().to_string())
}

/// Which rows `Catalog::list_all` returns.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    All,
    FavouritesOnly,
}
