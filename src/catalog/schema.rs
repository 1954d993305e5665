use rusqlite::{Connection, Transaction, params};
use tracing::info;

type Migration = fn(&Transaction<'_>) -> rusqlite::Result<()>;

/// Applied in order; `PRAGMA user_version` records how many have run.
const MIGRATIONS: &[Migration] = &[create_music_table, add_favourited_column, index_listing_order];

/// Bring the schema up to date. Safe to call on every open.
pub(super) fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    for (version, step) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        let version = version as u32 + 1;
        let tx = conn.transaction()?;
        step(&tx)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!(version, "applied catalog migration");
    }

    Ok(current.max(MIGRATIONS.len() as u32))
}

fn create_music_table(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS music (
            id     INTEGER PRIMARY KEY AUTOINCREMENT,
            path   TEXT NOT NULL UNIQUE,
            title  TEXT NOT NULL,
            artist TEXT NOT NULL,
            album  TEXT NOT NULL
        )",
    )
}

/// Databases written before versioning already carry the column.
fn add_favourited_column(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    if has_column(tx, "music", "favourited")? {
        return Ok(());
    }
    tx.execute_batch("ALTER TABLE music ADD COLUMN favourited INTEGER NOT NULL DEFAULT 0")
}

fn index_listing_order(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch("CREATE INDEX IF NOT EXISTS idx_music_artist_title ON music(artist, title)")
}

pub(super) fn has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        params![table, column],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n > 0)
}
