use std::borrow::Cow;
use std::path::Path;

use lofty::file::TaggedFileExt;
use lofty::tag::Accessor;
use tracing::{debug, warn};

use super::model::TrackMetadata;

/// Placeholder for a missing artist or album.
pub const UNKNOWN: &str = "Unknown";

/// Read title/artist/album from the file's embedded tags.
///
/// Never fails: an unreadable file or tag degrades to defaults, and each
/// field that is absent or blank after trimming falls back on its own
/// (see [`TrackMetadata::with_defaults`]).
pub fn extract(path: &Path) -> TrackMetadata {
    let mut title = None;
    let mut artist = None;
    let mut album = None;

    match lofty::read_from_path(path) {
        Ok(tagged) => {
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                title = non_blank(tag.title());
                artist = non_blank(tag.artist());
                album = non_blank(tag.album());
            } else {
                debug!(path = %path.display(), "no tags present, using defaults");
            }
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not read tags, using defaults");
        }
    }

    TrackMetadata::with_defaults(path, title, artist, album)
}

fn non_blank(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
