//! SQLite schema for the songs database.
//!
//! Songs are keyed by an integer rowid, which doubles as insertion order, and
//! looked up by their unique text id.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP_MS};
use anyhow::Result;
use rusqlite::Connection;

const SONGS_COLUMNS: &[Column<'static>] = &[
    sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
    sqlite_column!("id", &SqlType::Text, non_null = true), // hyphenated uuid
    sqlite_column!("title", &SqlType::Text, non_null = true),
    sqlite_column!("artist", &SqlType::Text, non_null = true),
    sqlite_column!("album", &SqlType::Text, non_null = true),
    sqlite_column!("genre", &SqlType::Text, non_null = true),
    sqlite_column!(
        "created_at",
        &SqlType::Integer,
        non_null = true,
        default_value = Some(DEFAULT_TIMESTAMP_MS)
    ), // epoch millis
    sqlite_column!(
        "updated_at",
        &SqlType::Integer,
        non_null = true,
        default_value = Some(DEFAULT_TIMESTAMP_MS)
    ),
];

const SONGS_TABLE_V0: Table = Table {
    name: "songs",
    columns: SONGS_COLUMNS,
    indices: &[("idx_songs_id", "id"), ("idx_songs_created_at", "created_at")],
    unique_constraints: &[&["id"]],
};

/// V1 indexes the grouping columns used by the statistics queries.
const SONGS_TABLE_V1: Table = Table {
    name: "songs",
    columns: SONGS_COLUMNS,
    indices: &[
        ("idx_songs_id", "id"),
        ("idx_songs_created_at", "created_at"),
        ("idx_songs_artist", "artist"),
        ("idx_songs_album", "album"),
        ("idx_songs_genre", "genre"),
    ],
    unique_constraints: &[&["id"]],
};

fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_songs_artist ON songs(artist);
         CREATE INDEX IF NOT EXISTS idx_songs_album ON songs(album);
         CREATE INDEX IF NOT EXISTS idx_songs_genre ON songs(genre);",
    )?;
    Ok(())
}

pub const SONGS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[SONGS_TABLE_V0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[SONGS_TABLE_V1],
        migration: Some(migrate_v0_to_v1),
    },
];
