//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations (site options, user metadata)

mod database;

pub use database::Database;
