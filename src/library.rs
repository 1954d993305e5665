//! Library model, tag extraction and the audio-file walker.
//!
//! Nothing here touches the catalog; the sync engine glues these pieces to
//! `Catalog`.

mod model;
mod scan;
mod tags;

pub use model::*;
pub use scan::audio_files;
pub use tags::{UNKNOWN, extract};
