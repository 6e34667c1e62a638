//! Song records and derived statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque, system generated song identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(Uuid);

impl SongId {
    pub fn generate() -> Self {
        SongId(Uuid::new_v4())
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SongId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SongId)
    }
}

/// A persisted track record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(rename = "_id")]
    pub id: SongId,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The four content fields of a song that clients may write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SongField {
    Title,
    Artist,
    Album,
    Genre,
}

impl SongField {
    pub const ALL: [SongField; 4] = [
        SongField::Title,
        SongField::Artist,
        SongField::Album,
        SongField::Genre,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SongField::Title => "title",
            SongField::Artist => "artist",
            SongField::Album => "album",
            SongField::Genre => "genre",
        }
    }

    pub fn from_name(name: &str) -> Option<SongField> {
        SongField::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Column holding this field in the songs table.
    pub(crate) fn column(&self) -> &'static str {
        self.name()
    }
}

/// Validated content of a song about to be created. Values are trimmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
}

/// Validated partial update. Only the fields present are written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

impl SongPatch {
    pub fn set(&mut self, field: SongField, value: String) {
        match field {
            SongField::Title => self.title = Some(value),
            SongField::Artist => self.artist = Some(value),
            SongField::Album => self.album = Some(value),
            SongField::Genre => self.genre = Some(value),
        }
    }

    /// Fields set by this patch, in declaration order.
    pub fn fields(&self) -> Vec<(SongField, &str)> {
        [
            (SongField::Title, &self.title),
            (SongField::Artist, &self.artist),
            (SongField::Album, &self.album),
            (SongField::Genre, &self.genre),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }
}

/// One page of a song listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPage {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub items: Vec<Song>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    pub total_songs: u64,
    pub total_artists: u64,
    pub total_albums: u64,
    pub total_genres: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreStats {
    pub genre: String,
    pub songs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistStats {
    pub artist: String,
    pub songs: u64,
    pub albums: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumStats {
    pub album: String,
    pub songs: u64,
    pub artists: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistSongCount {
    pub artist: String,
    pub songs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumSongCount {
    pub album: String,
    pub songs: u64,
}

/// A ranked top list, serialized as `{"by": ..., "items": [...]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "items")]
pub enum TopList {
    #[serde(rename = "artistsBySongs")]
    ArtistsBySongs(Vec<ArtistSongCount>),
    #[serde(rename = "albumsBySongs")]
    AlbumsBySongs(Vec<AlbumSongCount>),
}
