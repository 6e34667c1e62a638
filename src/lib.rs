//! Songs catalog server library
//!
//! This library exposes the internal modules for testing and reuse by the
//! command line client.

pub mod client;
pub mod config;
pub mod server;
pub mod song_store;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use server::{run_server, RequestsLoggingLevel};
pub use song_store::{SongStore, SqliteSongStore};
