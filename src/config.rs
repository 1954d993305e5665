//! Configuration loader and schema types.
//!
//! This module exposes the settings schema (music folders, catalog location,
//! scan cadence, credentials) and helpers to load it from disk and the
//! environment. Settings are read once at startup.

mod load;
mod schema;

pub use load::{default_config_path, default_data_dir, resolve_config_path};
pub use schema::*;
