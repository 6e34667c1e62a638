//! SQLite-backed song store.
//!
//! Writes go through a single connection; reads are spread round-robin over a
//! small pool of read-only connections, which WAL mode lets run alongside the
//! writer.

use super::models::*;
use super::query::{fold_case, order_by_sql, Grouping, ListQuery, TopBy, FOLD_CASE_FN};
use super::schema::SONGS_VERSIONED_SCHEMAS;
use super::trait_def::SongStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const SONG_COLUMNS: &str = "id, title, artist, album, genre, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteSongStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = SONGS_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &SONGS_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating songs db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "Database has user_version {} and does not look like a songs database",
            db_version
        );
    }

    let mut current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version > latest_version {
        bail!(
            "Songs db version {} is newer than the latest known version {}",
            current_version,
            latest_version
        );
    }

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in SONGS_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating songs db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
            }
            current_version = schema.version;
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest_schema
        .validate(conn)
        .context("Songs db schema validation failed")?;
    Ok(())
}

/// Registers the scalar functions the generated queries rely on.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(fold_case(&ctx.get::<String>(0)?)),
    )
    .context("Failed to register SQL functions")?;
    Ok(())
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| anyhow!("Songs db connection mutex poisoned"))
}

fn millis_to_datetime(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

/// Current time, truncated to the millisecond precision stored in the db.
fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn song_from_row(row: &Row) -> rusqlite::Result<Song> {
    let id: String = row.get(0)?;
    let id = id.parse::<SongId>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Song {
        id,
        title: row.get(1)?,
        artist: row.get(2)?,
        album: row.get(3)?,
        genre: row.get(4)?,
        created_at: millis_to_datetime(5, row.get(5)?)?,
        updated_at: millis_to_datetime(6, row.get(6)?)?,
    })
}

fn count(row: &Row, index: usize) -> rusqlite::Result<u64> {
    Ok(row.get::<_, i64>(index)?.max(0) as u64)
}

fn select_song(conn: &Connection, id: &SongId) -> Result<Option<Song>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM songs WHERE id = ?1", SONG_COLUMNS),
            params![id.to_string()],
            song_from_row,
        )
        .optional()?)
}

impl SqliteSongStore {
    /// Open (or create) the songs database at `db_path`, migrating its schema
    /// to the latest version.
    ///
    /// `read_pool_size` is the number of read-only connections; at least one
    /// is always opened.
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open songs database {:?}", db_path_ref))?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        register_functions(&write_conn)?;
        migrate_if_needed(&mut write_conn)?;

        let song_count: i64 = write_conn.query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))?;
        info!("Opened songs db {:?} with {} songs", db_path_ref, song_count);

        let read_pool_size = read_pool_size.max(1);
        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            register_functions(&read_conn)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteSongStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn grouped<T>(
        &self,
        grouping: Grouping,
        map: impl Fn(&Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        let mut stmt = conn.prepare(&grouping.sql())?;
        let rows = stmt.query_map([], |row| map(row))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn ranked<T>(
        &self,
        grouping: Grouping,
        limit: u32,
        map: impl Fn(&Row) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        let mut stmt = conn.prepare(&grouping.ranking_sql())?;
        let rows = stmt.query_map(params![limit], |row| map(row))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

impl SongStore for SqliteSongStore {
    fn create_song(&self, song: &NewSong) -> Result<Song> {
        let id = SongId::generate();
        let now = now_millis();

        let conn = lock(&self.write_conn)?;
        conn.execute(
            "INSERT INTO songs (id, title, artist, album, genre, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                id.to_string(),
                song.title,
                song.artist,
                song.album,
                song.genre,
                now
            ],
        )?;
        debug!("Created song {}", id);

        let timestamp = millis_to_datetime(5, now)?;
        Ok(Song {
            id,
            title: song.title.clone(),
            artist: song.artist.clone(),
            album: song.album.clone(),
            genre: song.genre.clone(),
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    fn list_songs(&self, query: &ListQuery) -> Result<SongPage> {
        let predicate = query.filter.to_sql();
        let pagination = query.pagination;

        let read_conn = self.get_read_conn();
        let mut conn = lock(&read_conn)?;
        // Count and page come from the same snapshot.
        let tx = conn.transaction()?;

        let total = tx.query_row(
            &format!("SELECT COUNT(*) FROM songs {}", predicate.clause),
            params_from_iter(predicate.args.iter()),
            |r| count(r, 0),
        )?;

        let sql = format!(
            "SELECT {} FROM songs {} {} LIMIT ? OFFSET ?",
            SONG_COLUMNS,
            predicate.clause,
            order_by_sql(&query.sort)
        );
        let args = predicate.args.iter().cloned().chain([
            Value::Integer(i64::from(pagination.limit)),
            Value::Integer(pagination.offset()),
        ]);
        let items = {
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(args), song_from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;

        Ok(SongPage {
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_pages: pagination.total_pages(total),
            items,
        })
    }

    fn get_song(&self, id: &SongId) -> Result<Option<Song>> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        select_song(&conn, id)
    }

    fn update_song(&self, id: &SongId, patch: &SongPatch) -> Result<Option<Song>> {
        let fields = patch.fields();
        let mut assignments: Vec<String> = fields
            .iter()
            .map(|(field, _)| format!("{} = ?", field.column()))
            .collect();
        assignments.push("updated_at = MAX(created_at, ?)".to_string());

        let args = fields
            .iter()
            .map(|(_, value)| Value::Text(value.to_string()))
            .chain([Value::Integer(now_millis()), Value::Text(id.to_string())]);

        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            &format!("UPDATE songs SET {} WHERE id = ?", assignments.join(", ")),
            params_from_iter(args),
        )?;
        if changed == 0 {
            return Ok(None);
        }
        let updated = select_song(&tx, id)?;
        tx.commit()?;

        debug!("Updated song {} ({} fields)", id, fields.len());
        Ok(updated)
    }

    fn delete_song(&self, id: &SongId) -> Result<Option<SongId>> {
        let conn = lock(&self.write_conn)?;
        let deleted = conn.execute("DELETE FROM songs WHERE id = ?1", params![id.to_string()])?;
        if deleted == 0 {
            return Ok(None);
        }
        debug!("Deleted song {}", id);
        Ok(Some(*id))
    }

    fn stats_overview(&self) -> Result<StatsOverview> {
        let read_conn = self.get_read_conn();
        let conn = lock(&read_conn)?;
        Ok(conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT artist), COUNT(DISTINCT album), COUNT(DISTINCT genre)
             FROM songs",
            [],
            |r| {
                Ok(StatsOverview {
                    total_songs: count(r, 0)?,
                    total_artists: count(r, 1)?,
                    total_albums: count(r, 2)?,
                    total_genres: count(r, 3)?,
                })
            },
        )?)
    }

    fn stats_by_genre(&self) -> Result<Vec<GenreStats>> {
        self.grouped(Grouping::Genre, |r| {
            Ok(GenreStats {
                genre: r.get(0)?,
                songs: count(r, 1)?,
            })
        })
    }

    fn stats_by_artist(&self) -> Result<Vec<ArtistStats>> {
        self.grouped(Grouping::Artist, |r| {
            Ok(ArtistStats {
                artist: r.get(0)?,
                songs: count(r, 1)?,
                albums: count(r, 2)?,
            })
        })
    }

    fn stats_by_album(&self) -> Result<Vec<AlbumStats>> {
        self.grouped(Grouping::Album, |r| {
            Ok(AlbumStats {
                album: r.get(0)?,
                songs: count(r, 1)?,
                artists: count(r, 2)?,
            })
        })
    }

    fn top(&self, by: TopBy, limit: u32) -> Result<TopList> {
        match by {
            TopBy::Songs => self
                .ranked(Grouping::Artist, limit, |r| {
                    Ok(ArtistSongCount {
                        artist: r.get(0)?,
                        songs: count(r, 1)?,
                    })
                })
                .map(TopList::ArtistsBySongs),
            TopBy::Albums => self
                .ranked(Grouping::Album, limit, |r| {
                    Ok(AlbumSongCount {
                        album: r.get(0)?,
                        songs: count(r, 1)?,
                    })
                })
                .map(TopList::AlbumsBySongs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song_store::query::{ListParams, Pagination, SongFilter};
    use tempfile::TempDir;

    fn create_test_store() -> (SqliteSongStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteSongStore::new(temp_dir.path().join("songs.db"), 2).unwrap();
        (store, temp_dir)
    }

    fn new_song(title: &str, artist: &str, album: &str, genre: &str) -> NewSong {
        NewSong {
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            genre: genre.to_string(),
        }
    }

    fn seed(store: &SqliteSongStore) -> Vec<Song> {
        [
            ("So What", "Miles Davis", "Kind of Blue", "Jazz"),
            ("Blue in Green", "Miles Davis", "Kind of Blue", "Jazz"),
            ("Freddie Freeloader", "Miles Davis", "Kind of Blue", "Jazz"),
            ("Milestones", "Miles Davis", "Milestones", "Jazz"),
            ("Come Together", "The Beatles", "Abbey Road", "Rock"),
            ("Something", "The Beatles", "Abbey Road", "Rock"),
            ("Stairway to Heaven", "Led Zeppelin", "Led Zeppelin IV", "Rock"),
        ]
        .iter()
        .map(|(t, a, b, g)| store.create_song(&new_song(t, a, b, g)).unwrap())
        .collect()
    }

    fn list(store: &SqliteSongStore, params: ListParams) -> SongPage {
        store.list_songs(&ListQuery::from_params(&params)).unwrap()
    }

    // =========================================================================
    // Records
    // =========================================================================

    #[test]
    fn create_then_get_returns_same_record() {
        let (store, _dir) = create_test_store();
        let created = store
            .create_song(&new_song("So What", "Miles Davis", "Kind of Blue", "Jazz"))
            .unwrap();

        assert_eq!(created.created_at, created.updated_at);
        let fetched = store.get_song(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn get_unknown_song_is_none() {
        let (store, _dir) = create_test_store();
        assert!(store.get_song(&SongId::generate()).unwrap().is_none());
    }

    #[test]
    fn default_listing_is_newest_first() {
        let (store, _dir) = create_test_store();
        let seeded = seed(&store);

        let page = list(&store, ListParams::default());
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 20);

        let titles: Vec<_> = page.items.iter().map(|s| s.title.as_str()).collect();
        let mut expected: Vec<_> = seeded.iter().map(|s| s.title.as_str()).collect();
        expected.reverse();
        assert_eq!(titles, expected);
    }

    #[test]
    fn pagination_windows_are_disjoint() {
        let (store, _dir) = create_test_store();
        seed(&store);

        let mut seen = Vec::new();
        for page in 1..=3 {
            let result = store
                .list_songs(&ListQuery {
                    pagination: Pagination { page, limit: 3 },
                    ..ListQuery::default()
                })
                .unwrap();
            assert_eq!(result.total, 7);
            assert_eq!(result.total_pages, 3);
            seen.extend(result.items.into_iter().map(|s| s.id));
        }
        assert_eq!(seen.len(), 7);
        seen.sort_by_key(|id| id.to_string());
        seen.dedup();
        assert_eq!(seen.len(), 7);

        let beyond = store
            .list_songs(&ListQuery {
                pagination: Pagination { page: 9, limit: 3 },
                ..ListQuery::default()
            })
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 7);
    }

    #[test]
    fn field_filters_are_case_insensitive_substrings() {
        let (store, _dir) = create_test_store();
        seed(&store);

        let page = list(
            &store,
            ListParams {
                artist: Some("miles".to_string()),
                album: Some("BLUE".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(|s| s.album == "Kind of Blue"));
    }

    #[test]
    fn free_text_search_matches_any_field() {
        let (store, _dir) = create_test_store();
        seed(&store);

        // "rock" only appears as a genre, "road" only in an album.
        let page = list(
            &store,
            ListParams {
                q: Some("rock".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 3);

        let page = list(
            &store,
            ListParams {
                q: Some("road".to_string()),
                genre: Some("rock".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 2);
    }

    #[test]
    fn filter_values_are_literal() {
        let (store, _dir) = create_test_store();
        seed(&store);
        store
            .create_song(&new_song("100% Pure", "Someone", "A_B", "Pop"))
            .unwrap();

        let filtered = |filter: SongFilter| {
            store
                .list_songs(&ListQuery {
                    filter,
                    ..ListQuery::default()
                })
                .unwrap()
                .total
        };

        assert_eq!(filtered(SongFilter::default().with_search("%")), 1);
        assert_eq!(filtered(SongFilter::default().with_search("_")), 1);
        assert_eq!(filtered(SongFilter::default().with_search(".*")), 0);
        assert_eq!(
            filtered(SongFilter::default().with_field(SongField::Album, "a_b")),
            1
        );
    }

    #[test]
    fn matching_ignores_case_of_non_ascii_letters() {
        let (store, _dir) = create_test_store();
        store
            .create_song(&new_song("Hoppípolla", "Sigur Rós", "Takk...", "Post-rock"))
            .unwrap();
        store
            .create_song(&new_song("Jóga", "Björk", "Homogenic", "Électronique"))
            .unwrap();

        let total = |params: ListParams| list(&store, params).total;

        assert_eq!(
            total(ListParams {
                q: Some("RÓS".to_string()),
                ..Default::default()
            }),
            1
        );
        assert_eq!(
            total(ListParams {
                artist: Some("BJÖRK".to_string()),
                ..Default::default()
            }),
            1
        );
        assert_eq!(
            total(ListParams {
                genre: Some("électronique".to_string()),
                ..Default::default()
            }),
            1
        );
        assert_eq!(
            total(ListParams {
                title: Some("HOPPÍ".to_string()),
                ..Default::default()
            }),
            1
        );
    }

    #[test]
    fn explicit_sort_orders_by_field() {
        let (store, _dir) = create_test_store();
        seed(&store);

        let page = list(
            &store,
            ListParams {
                sort: Some("artist -title".to_string()),
                ..Default::default()
            },
        );
        let pairs: Vec<_> = page
            .items
            .iter()
            .map(|s| (s.artist.as_str(), s.title.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Led Zeppelin", "Stairway to Heaven"),
                ("Miles Davis", "So What"),
                ("Miles Davis", "Milestones"),
                ("Miles Davis", "Freddie Freeloader"),
                ("Miles Davis", "Blue in Green"),
                ("The Beatles", "Something"),
                ("The Beatles", "Come Together"),
            ]
        );
    }

    #[test]
    fn update_applies_patch_and_bumps_updated_at() {
        let (store, _dir) = create_test_store();
        let created = store
            .create_song(&new_song("So What", "Miles Davis", "Kind of Blue", "Jazz"))
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let mut patch = SongPatch::default();
        patch.set(SongField::Genre, "Modal Jazz".to_string());
        let updated = store.update_song(&created.id, &patch).unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.genre, "Modal Jazz");
        assert_eq!(updated.title, "So What");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(store.get_song(&created.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn update_unknown_song_is_none() {
        let (store, _dir) = create_test_store();
        let mut patch = SongPatch::default();
        patch.set(SongField::Title, "x".to_string());
        assert!(store
            .update_song(&SongId::generate(), &patch)
            .unwrap()
            .is_none());
    }

    #[test]
    fn delete_removes_record_once() {
        let (store, _dir) = create_test_store();
        let songs = seed(&store);
        let id = songs[0].id;

        assert_eq!(store.delete_song(&id).unwrap(), Some(id));
        assert!(store.get_song(&id).unwrap().is_none());
        assert_eq!(store.delete_song(&id).unwrap(), None);
        assert_eq!(store.stats_overview().unwrap().total_songs, 6);
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    #[test]
    fn stats_on_empty_store() {
        let (store, _dir) = create_test_store();
        assert_eq!(
            store.stats_overview().unwrap(),
            StatsOverview {
                total_songs: 0,
                total_artists: 0,
                total_albums: 0,
                total_genres: 0,
            }
        );
        assert!(store.stats_by_genre().unwrap().is_empty());
        assert_eq!(
            store.top(TopBy::Songs, 10).unwrap(),
            TopList::ArtistsBySongs(vec![])
        );
    }

    #[test]
    fn overview_counts_distinct_values() {
        let (store, _dir) = create_test_store();
        seed(&store);
        assert_eq!(
            store.stats_overview().unwrap(),
            StatsOverview {
                total_songs: 7,
                total_artists: 3,
                total_albums: 4,
                total_genres: 2,
            }
        );
    }

    #[test]
    fn grouped_stats_are_ranked() {
        let (store, _dir) = create_test_store();
        seed(&store);

        assert_eq!(
            store.stats_by_genre().unwrap(),
            vec![
                GenreStats {
                    genre: "Jazz".to_string(),
                    songs: 4
                },
                GenreStats {
                    genre: "Rock".to_string(),
                    songs: 3
                },
            ]
        );

        let artists = store.stats_by_artist().unwrap();
        assert_eq!(
            artists[0],
            ArtistStats {
                artist: "Miles Davis".to_string(),
                songs: 4,
                albums: 2
            }
        );
        assert_eq!(artists[1].artist, "The Beatles");
        assert_eq!(artists[2].artist, "Led Zeppelin");

        let albums = store.stats_by_album().unwrap();
        assert_eq!(
            albums[0],
            AlbumStats {
                album: "Kind of Blue".to_string(),
                songs: 3,
                artists: 1
            }
        );
        // Ties on song count fall back to the album name.
        let singles: Vec<_> = albums[2..].iter().map(|a| a.album.as_str()).collect();
        assert_eq!(singles, vec!["Led Zeppelin IV", "Milestones"]);
    }

    #[test]
    fn top_lists_respect_limit() {
        let (store, _dir) = create_test_store();
        seed(&store);

        assert_eq!(
            store.top(TopBy::Songs, 2).unwrap(),
            TopList::ArtistsBySongs(vec![
                ArtistSongCount {
                    artist: "Miles Davis".to_string(),
                    songs: 4
                },
                ArtistSongCount {
                    artist: "The Beatles".to_string(),
                    songs: 2
                },
            ])
        );

        match store.top(TopBy::Albums, 1).unwrap() {
            TopList::AlbumsBySongs(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].album, "Kind of Blue");
            }
            other => panic!("unexpected top list {:?}", other),
        }
    }

    // =========================================================================
    // Schema
    // =========================================================================

    #[test]
    fn reopening_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("songs.db");

        let id = {
            let store = SqliteSongStore::new(&db_path, 1).unwrap();
            store
                .create_song(&new_song("a", "b", "c", "d"))
                .unwrap()
                .id
        };

        let store = SqliteSongStore::new(&db_path, 1).unwrap();
        assert_eq!(store.get_song(&id).unwrap().unwrap().title, "a");
    }

    #[test]
    fn v0_database_is_migrated_on_open() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("songs.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            SONGS_VERSIONED_SCHEMAS[0].create(&conn).unwrap();
        }

        SqliteSongStore::new(&db_path, 1).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let version: usize = conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, BASE_DB_VERSION + SONGS_VERSIONED_SCHEMAS.len() - 1);
    }

    #[test]
    fn foreign_database_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("other.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute("CREATE TABLE other (x INTEGER)", []).unwrap();
        }

        assert!(SqliteSongStore::new(&db_path, 1).is_err());
    }
}
