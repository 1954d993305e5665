//! SQLite-backed catalog of tracks.
//!
//! `Catalog` owns uniqueness on `path`, ordering, search and the favourite
//! flag. The schema is versioned through `PRAGMA user_version`.

mod schema;
mod store;

pub use store::Catalog;

#[cfg(test)]
mod tests;
