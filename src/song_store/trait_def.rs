//! SongStore trait definition.

use super::models::*;
use super::query::{ListQuery, TopBy};
use anyhow::Result;

/// Storage backend for song records and their aggregate statistics.
///
/// `Ok(None)` from the id based operations means the song does not exist.
pub trait SongStore: Send + Sync {
    // =========================================================================
    // Records
    // =========================================================================

    /// Persist a new song, assigning its id and timestamps.
    fn create_song(&self, song: &NewSong) -> Result<Song>;

    /// One filtered, sorted page of songs together with the filtered total.
    fn list_songs(&self, query: &ListQuery) -> Result<SongPage>;

    fn get_song(&self, id: &SongId) -> Result<Option<Song>>;

    /// Apply `patch` and bump `updated_at`. Returns the post-update record.
    fn update_song(&self, id: &SongId, patch: &SongPatch) -> Result<Option<Song>>;

    /// Returns the id of the deleted song.
    fn delete_song(&self, id: &SongId) -> Result<Option<SongId>>;

    // =========================================================================
    // Statistics
    // =========================================================================

    fn stats_overview(&self) -> Result<StatsOverview>;

    fn stats_by_genre(&self) -> Result<Vec<GenreStats>>;

    fn stats_by_artist(&self) -> Result<Vec<ArtistStats>>;

    fn stats_by_album(&self) -> Result<Vec<AlbumStats>>;

    /// The `limit` highest ranked artists or albums by song count.
    fn top(&self, by: TopBy, limit: u32) -> Result<TopList>;
}
