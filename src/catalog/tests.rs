use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use rusqlite::Connection;

use super::schema::has_column;
use super::store::escape_like;
use super::*;
use crate::config::CatalogSettings;
use crate::error::Error;
use crate::library::{ListFilter, TrackId, TrackMetadata};
use crate::test_support::scratch_catalog;

fn meta(title: &str, artist: &str, album: &str) -> TrackMetadata {
    TrackMetadata {
        title: title.into(),
        artist: artist.into(),
        album: album.into(),
    }
}

fn insert(catalog: &Catalog, path: &str, title: &str, artist: &str) -> TrackId {
    assert!(
        catalog
            .upsert_if_absent(Path::new(path), &meta(title, artist, "Album"))
            .unwrap()
    );
    catalog
        .list_all(ListFilter::All)
        .unwrap()
        .into_iter()
        .find(|t| t.path == Path::new(path))
        .unwrap()
        .id
}

#[test]
fn upsert_if_absent_never_overwrites() {
    let (_dir, catalog) = scratch_catalog();
    let path = Path::new("/music/a.mp3");

    assert!(catalog.upsert_if_absent(path, &meta("Song A", "X", "One")).unwrap());
    assert!(!catalog.upsert_if_absent(path, &meta("Changed", "Y", "Two")).unwrap());

    let all = catalog.list_all(ListFilter::All).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Song A");
    assert_eq!(all[0].artist, "X");
    assert_eq!(all[0].album, "One");
    assert!(!all[0].favourited);
    assert!(catalog.contains_path(path).unwrap());
    assert!(!catalog.contains_path(Path::new("/music/b.mp3")).unwrap());
}

#[test]
fn list_all_orders_by_artist_then_title_case_sensitive() {
    let (_dir, catalog) = scratch_catalog();
    insert(&catalog, "/m/1.mp3", "Zebra", "ABBA");
    insert(&catalog, "/m/2.mp3", "Alpha", "ABBA");
    insert(&catalog, "/m/3.mp3", "Song", "abba");
    insert(&catalog, "/m/4.mp3", "Song", "Beatles");

    let titles: Vec<(String, String)> = catalog
        .list_all(ListFilter::All)
        .unwrap()
        .into_iter()
        .map(|t| (t.artist, t.title))
        .collect();
    assert_eq!(
        titles,
        vec![
            ("ABBA".to_string(), "Alpha".to_string()),
            ("ABBA".to_string(), "Zebra".to_string()),
            ("Beatles".to_string(), "Song".to_string()),
            ("abba".to_string(), "Song".to_string()),
        ]
    );
}

#[test]
fn list_all_can_narrow_to_favourites() {
    let (_dir, catalog) = scratch_catalog();
    let a = insert(&catalog, "/m/a.mp3", "A", "X");
    insert(&catalog, "/m/b.mp3", "B", "X");

    assert!(catalog.list_all(ListFilter::FavouritesOnly).unwrap().is_empty());
    catalog.toggle_favourite(a).unwrap();

    let favs = catalog.list_all(ListFilter::FavouritesOnly).unwrap();
    assert_eq!(favs.len(), 1);
    assert_eq!(favs[0].id, a);
    assert!(favs[0].favourited);
}

#[test]
fn search_is_case_insensitive_substring_over_all_fields() {
    let (_dir, catalog) = scratch_catalog();
    insert(&catalog, "/m/help.mp3", "Help!", "The Beatles");
    insert(&catalog, "/m/angie.mp3", "Angie", "Rolling Stones");
    catalog
        .upsert_if_absent(
            Path::new("/m/live/track.flac"),
            &meta("Track", "Someone", "Live at Beatles Hall"),
        )
        .unwrap();

    let hits = catalog.search("beatles").unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|t| t.artist != "Rolling Stones"));

    let by_path = catalog.search("/LIVE/").unwrap();
    assert_eq!(by_path.len(), 1);
    assert_eq!(by_path[0].title, "Track");

    assert_eq!(catalog.search("").unwrap().len(), 3);
    assert!(catalog.search("nothing like this").unwrap().is_empty());
}

#[test]
fn search_treats_wildcards_literally() {
    let (_dir, catalog) = scratch_catalog();
    insert(&catalog, "/m/a.mp3", "100% Pure", "X");
    insert(&catalog, "/m/b.mp3", "1000 Pure", "X");
    insert(&catalog, "/m/c.mp3", "snake_case", "X");
    insert(&catalog, "/m/d.mp3", "snakeXcase", "X");

    let hits = catalog.search("100%").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "100% Pure");

    let hits = catalog.search("e_c").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "snake_case");

    assert_eq!(escape_like(r"a%b_c\d"), r"a\%b\_c\\d");
}

#[test]
fn toggle_favourite_flips_and_reports_not_found() {
    let (_dir, catalog) = scratch_catalog();
    let id = insert(&catalog, "/m/a.mp3", "A", "X");

    assert!(catalog.toggle_favourite(id).unwrap());
    assert!(catalog.get_by_id(id).unwrap().favourited);
    assert!(!catalog.toggle_favourite(id).unwrap());
    assert!(!catalog.get_by_id(id).unwrap().favourited);

    let missing = TrackId::new(id.get() + 1000);
    assert!(matches!(
        catalog.toggle_favourite(missing),
        Err(Error::NotFound(m)) if m == missing
    ));
}

#[test]
fn get_by_id_and_file_path_for() {
    let (_dir, catalog) = scratch_catalog();
    let id = insert(&catalog, "/m/a.mp3", "A", "X");

    let track = catalog.get_by_id(id).unwrap();
    assert_eq!(track.path, PathBuf::from("/m/a.mp3"));
    assert_eq!(catalog.file_path_for(id).unwrap(), PathBuf::from("/m/a.mp3"));

    let missing = TrackId::new(-1);
    assert!(matches!(catalog.get_by_id(missing), Err(Error::NotFound(_))));
    assert!(matches!(catalog.file_path_for(missing), Err(Error::NotFound(_))));
}

#[test]
fn deletes_and_count() {
    let (_dir, catalog) = scratch_catalog();
    let a = insert(&catalog, "/m/a.mp3", "A", "X");
    insert(&catalog, "/m/b.mp3", "B", "X");
    insert(&catalog, "/m/c.mp3", "C", "X");
    assert_eq!(catalog.count().unwrap(), 3);

    assert!(catalog.delete_by_id(a).unwrap());
    assert!(!catalog.delete_by_id(a).unwrap());
    assert!(catalog.delete_by_path(Path::new("/m/b.mp3")).unwrap());
    assert!(!catalog.delete_by_path(Path::new("/m/b.mp3")).unwrap());
    assert_eq!(catalog.count().unwrap(), 1);

    let entries = catalog.all_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1, PathBuf::from("/m/c.mp3"));
}

#[test]
fn ids_are_never_reused_after_delete() {
    let (_dir, catalog) = scratch_catalog();
    let a = insert(&catalog, "/m/a.mp3", "A", "X");
    catalog.delete_by_id(a).unwrap();
    let b = insert(&catalog, "/m/a.mp3", "A", "X");
    assert!(b > a);
}

#[test]
fn reopen_preserves_rows_and_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let settings = CatalogSettings {
        db_path: dir.path().join("towerofsong.db"),
        pool_size: 2,
        busy_timeout_ms: 1_000,
    };

    let id = {
        let catalog = Catalog::open(&settings).unwrap();
        let id = insert(&catalog, "/m/a.mp3", "A", "X");
        catalog.toggle_favourite(id).unwrap();
        id
    };

    let catalog = Catalog::open(&settings).unwrap();
    let track = catalog.get_by_id(id).unwrap();
    assert!(track.favourited);

    let conn = Connection::open(&settings.db_path).unwrap();
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |r| r.get(0))
        .unwrap();
    assert_eq!(version, 3);
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |r| r.get(0))
        .unwrap();
    assert_eq!(mode.to_ascii_lowercase(), "wal");
}

#[test]
fn opens_unversioned_database_that_already_has_favourited() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("legacy.db");
    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE music (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT UNIQUE,
                title TEXT,
                artist TEXT,
                album TEXT,
                favourited INTEGER DEFAULT 0
            );
            INSERT INTO music (path, title, artist, album, favourited)
                VALUES ('/m/old.mp3', 'Old', 'Someone', 'Unknown', 1);",
        )
        .unwrap();
    }

    let settings = CatalogSettings {
        db_path: db_path.clone(),
        pool_size: 1,
        busy_timeout_ms: 1_000,
    };
    let catalog = Catalog::open(&settings).unwrap();
    let all = catalog.list_all(ListFilter::All).unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].favourited);

    let conn = Connection::open(&db_path).unwrap();
    assert!(has_column(&conn, "music", "favourited").unwrap());
}

#[test]
fn concurrent_readers_see_whole_rows_during_writes() {
    let (_dir, catalog) = scratch_catalog();
    let catalog = Arc::new(catalog);

    let writer = {
        let catalog = Arc::clone(&catalog);
        thread::spawn(move || {
            for i in 0..200 {
                let path = PathBuf::from(format!("/m/{i:03}.mp3"));
                catalog
                    .upsert_if_absent(&path, &meta(&format!("T{i}"), "X", "Y"))
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                for _ in 0..50 {
                    for t in catalog.search("").unwrap() {
                        assert!(t.title.starts_with('T'));
                        assert_eq!(t.artist, "X");
                        assert_eq!(t.album, "Y");
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(catalog.count().unwrap(), 200);
}

#[test]
fn open_fails_with_store_init_when_parent_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    let settings = CatalogSettings {
        db_path: blocker.join("towerofsong.db"),
        pool_size: 1,
        busy_timeout_ms: 1_000,
    };

    match Catalog::open(&settings) {
        Err(Error::StoreInit { path, source }) => {
            assert_eq!(path, settings.db_path);
            assert!(source.downcast_ref::<std::io::Error>().is_some());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("catalog should not open under a regular file"),
    }
}
