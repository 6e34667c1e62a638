mod versioned_schema;

pub use versioned_schema::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP_MS};

/// Offset added to schema versions before they are written to `PRAGMA user_version`,
/// so that databases not created by this server are never mistaken for version 0.
pub const BASE_DB_VERSION: usize = 51000;
