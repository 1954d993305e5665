use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::config::CatalogSettings;
use crate::error::{Error, Result};
use crate::library::{ListFilter, TrackId, TrackMetadata, TrackRecord};

use super::schema::migrate;

const TRACK_COLUMNS: &str = "id, path, title, artist, album, COALESCE(favourited, 0)";

/// Persistent table of catalogued tracks.
///
/// Cloning is cheap and every clone shares one connection pool, so the
/// background scanner and any number of request handlers can hold their own
/// handle. Each operation is a single statement on a WAL-mode database:
/// readers never block on the scanner's writes and never see half a row.
#[derive(Clone)]
pub struct Catalog {
    pool: Pool<SqliteConnectionManager>,
}

impl Catalog {
    /// Open (creating if needed) the database at `settings.db_path` and
    /// migrate it to the current schema.
    pub fn open(settings: &CatalogSettings) -> Result<Self> {
        let path = settings.db_path.as_path();
        let init_err = |source: Box<dyn std::error::Error + Send + Sync>| Error::StoreInit {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| init_err(e.into()))?;
        }

        let busy_timeout = Duration::from_millis(settings.busy_timeout_ms);
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                row.get::<_, String>(0)
            })?;
            Ok(())
        });
        let pool = Pool::builder()
            .max_size(settings.pool_size)
            .build(manager)
            .map_err(|e| init_err(e.into()))?;

        let version = {
            let mut conn = pool.get().map_err(|e| init_err(e.into()))?;
            migrate(&mut conn).map_err(|e| init_err(e.into()))?
        };

        let catalog = Self { pool };
        info!(
            path = %path.display(),
            schema_version = version,
            tracks = catalog.count().map_err(|e| init_err(e.into()))?,
            "catalog opened"
        );
        Ok(catalog)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Insert a new row for `path` unless one exists. Returns whether a row
    /// was inserted; an existing row is left untouched.
    pub fn upsert_if_absent(&self, path: &Path, meta: &TrackMetadata) -> Result<bool> {
        let key = path_key(path)?;
        let inserted = self.conn()?.execute(
            "INSERT INTO music (path, title, artist, album) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(path) DO NOTHING",
            params![key, meta.title, meta.artist, meta.album],
        )?;
        if inserted > 0 {
            debug!(path = key, "catalogued new track");
        }
        Ok(inserted > 0)
    }

    pub fn contains_path(&self, path: &Path) -> Result<bool> {
        let key = path_key(path)?;
        let found = self
            .conn()?
            .query_row("SELECT 1 FROM music WHERE path = ?1", params![key], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// All rows ordered by artist then title (byte-wise, case-sensitive).
    pub fn list_all(&self, filter: ListFilter) -> Result<Vec<TrackRecord>> {
        let predicate = match filter {
            ListFilter::All => "",
            ListFilter::FavouritesOnly => "WHERE favourited = 1",
        };
        let sql = format!(
            "SELECT {TRACK_COLUMNS} FROM music {predicate} ORDER BY artist ASC, title ASC, id ASC"
        );
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], track_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Case-insensitive substring match over path, title, artist and album.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Result<Vec<TrackRecord>> {
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            r"SELECT {TRACK_COLUMNS} FROM music
              WHERE title LIKE ?1 ESCAPE '\' OR artist LIKE ?1 ESCAPE '\'
                 OR album LIKE ?1 ESCAPE '\' OR path LIKE ?1 ESCAPE '\'
              ORDER BY artist ASC, title ASC, id ASC"
        );
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern], track_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_by_id(&self, id: TrackId) -> Result<TrackRecord> {
        self.conn()?
            .query_row(
                &format!("SELECT {TRACK_COLUMNS} FROM music WHERE id = ?1"),
                params![id.get()],
                track_from_row,
            )
            .optional()?
            .ok_or(Error::NotFound(id))
    }

    /// Where the bytes for `id` live on disk.
    pub fn file_path_for(&self, id: TrackId) -> Result<PathBuf> {
        self.conn()?
            .query_row(
                "SELECT path FROM music WHERE id = ?1",
                params![id.get()],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .map(PathBuf::from)
            .ok_or(Error::NotFound(id))
    }

    /// Flip the favourite flag and return its new value.
    pub fn toggle_favourite(&self, id: TrackId) -> Result<bool> {
        self.conn()?
            .query_row(
                "UPDATE music SET favourited = NOT COALESCE(favourited, 0)
                 WHERE id = ?1 RETURNING favourited",
                params![id.get()],
                |row| row.get::<_, bool>(0),
            )
            .optional()?
            .ok_or(Error::NotFound(id))
    }

    pub fn delete_by_path(&self, path: &Path) -> Result<bool> {
        let key = path_key(path)?;
        let removed = self
            .conn()?
            .execute("DELETE FROM music WHERE path = ?1", params![key])?;
        Ok(removed > 0)
    }

    pub fn delete_by_id(&self, id: TrackId) -> Result<bool> {
        let removed = self
            .conn()?
            .execute("DELETE FROM music WHERE id = ?1", params![id.get()])?;
        Ok(removed > 0)
    }

    pub fn count(&self) -> Result<u64> {
        let n: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM music", [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    /// Snapshot of every `(id, path)` pair, for pruning.
    pub fn all_entries(&self) -> Result<Vec<(TrackId, PathBuf)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, path FROM music ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                TrackId::new(row.get(0)?),
                PathBuf::from(row.get::<_, String>(1)?),
            ))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn track_from_row(row: &Row<'_>) -> rusqlite::Result<TrackRecord> {
    Ok(TrackRecord {
        id: TrackId::new(row.get(0)?),
        path: PathBuf::from(row.get::<_, String>(1)?),
        title: row.get(2)?,
        artist: row.get(3)?,
        album: row.get(4)?,
        favourited: row.get(5)?,
    })
}

fn path_key(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))
}

/// Make `%`, `_` and `\` match literally under `LIKE ... ESCAPE '\'`.
pub(super) fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
