//! Tower of Song: keeps a SQLite catalog of a personal music collection in
//! sync with the folders it lives in, and serves that catalog to clients.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod runtime;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
