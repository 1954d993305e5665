//! Request-facing operations.
//!
//! `Library` is what an HTTP (or any other) front end holds: it checks the
//! session token, parses raw ids, calls into the catalog and turns internal
//! failures into a small set of user-visible errors. Clone it per handler.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::auth::TokenStore;
use crate::catalog::Catalog;
use crate::error::Error;
use crate::library::{ListFilter, TrackId, TrackRecord};
use crate::sync::{Scheduler, TriggerOutcome};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Details are logged, never returned.
    #[error("internal error")]
    Internal,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(_) => ApiError::NotFound,
            other => {
                error!(error = %other, "request failed");
                ApiError::Internal
            }
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_files: u64,
}

/// What `Library::stream` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Streamed {
    pub content_type: &'static str,
    pub bytes: u64,
}

#[derive(Clone)]
pub struct Library {
    catalog: Catalog,
    tokens: Arc<TokenStore>,
    scheduler: Scheduler,
}

impl Library {
    pub fn new(catalog: Catalog, tokens: Arc<TokenStore>, scheduler: Scheduler) -> Self {
        Self {
            catalog,
            tokens,
            scheduler,
        }
    }

    pub fn login(&self, username: &str, password: &str) -> ApiResult<String> {
        self.tokens
            .login(username, password)
            .ok_or(ApiError::Unauthorized)
    }

    pub fn logout(&self, token: &str) -> ApiResult<()> {
        if self.tokens.revoke(token) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    fn authorize(&self, token: &str) -> ApiResult<()> {
        if self.tokens.is_valid(token) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    pub fn stats(&self, token: &str) -> ApiResult<Stats> {
        self.authorize(token)?;
        Ok(Stats {
            total_files: self.catalog.count()?,
        })
    }

    pub fn list(&self, token: &str) -> ApiResult<Vec<TrackRecord>> {
        self.authorize(token)?;
        Ok(self.catalog.list_all(ListFilter::All)?)
    }

    pub fn favourites(&self, token: &str) -> ApiResult<Vec<TrackRecord>> {
        self.authorize(token)?;
        Ok(self.catalog.list_all(ListFilter::FavouritesOnly)?)
    }

    pub fn search(&self, token: &str, query: &str) -> ApiResult<Vec<TrackRecord>> {
        self.authorize(token)?;
        Ok(self.catalog.search(query)?)
    }

    pub fn track_info(&self, token: &str, id: &str) -> ApiResult<TrackRecord> {
        self.authorize(token)?;
        Ok(self.catalog.get_by_id(parse_id(id)?)?)
    }

    /// Returns the new favourite state.
    pub fn toggle_favourite(&self, token: &str, id: &str) -> ApiResult<bool> {
        self.authorize(token)?;
        Ok(self.catalog.toggle_favourite(parse_id(id)?)?)
    }

    pub fn resolve_path(&self, token: &str, id: &str) -> ApiResult<PathBuf> {
        self.authorize(token)?;
        Ok(self.catalog.file_path_for(parse_id(id)?)?)
    }

    /// Copy the track's bytes into `out`.
    pub fn stream<W: Write>(&self, token: &str, id: &str, out: &mut W) -> ApiResult<Streamed> {
        let path = self.resolve_path(token, id)?;
        let mut file = File::open(&path).map_err(|err| io_to_api(&path, err))?;
        info!(path = %path.display(), "streaming file");
        let bytes = io::copy(&mut file, out).map_err(|err| io_to_api(&path, err))?;
        Ok(Streamed {
            content_type: content_type_for(&path),
            bytes,
        })
    }

    /// Kick off a synchronization pass in the background, unless one is
    /// already running. Returns as soon as the pass has started.
    pub fn rescan(&self, token: &str) -> ApiResult<TriggerOutcome> {
        self.authorize(token)?;
        let outcome = self.scheduler.trigger_detached().map_err(Error::Io)?;
        if matches!(outcome, TriggerOutcome::Started) {
            info!("manual rescan started");
        }
        Ok(outcome)
    }
}

fn parse_id(raw: &str) -> ApiResult<TrackId> {
    if raw.trim().is_empty() {
        return Err(ApiError::InvalidInput("missing id".into()));
    }
    raw.parse()
        .map_err(|_| ApiError::InvalidInput(format!("malformed id '{raw}'")))
}

fn io_to_api(path: &Path, err: io::Error) -> ApiError {
    if err.kind() == io::ErrorKind::NotFound {
        ApiError::NotFound
    } else {
        error!(path = %path.display(), error = %err, "streaming failed");
        ApiError::Internal
    }
}

pub fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}
