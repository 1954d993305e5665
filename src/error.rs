//! Error types for the catalog core.
//!
//! Per-file failures during a synchronization pass (tag parsing, walking a
//! subtree, writing one row) are contained and logged where they happen.
//! Only startup errors (`Config`, `ConfigLoad`, `StoreInit`) are fatal.

use std::path::PathBuf;

use thiserror::Error;

use crate::library::TrackId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] ::config::ConfigError),

    #[error("cannot open catalog at '{}': {source}", path.display())]
    StoreInit {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("catalog query failed: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("catalog connection unavailable: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("track {0} not found")]
    NotFound(TrackId),

    #[error("path is not valid UTF-8 and cannot be catalogued: '{}'", .0.display())]
    InvalidPath(PathBuf),

    #[error("{0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
