mod models;
pub mod query;
mod schema;
mod store;
mod trait_def;
mod validation;

pub use models::*;
pub use query::{ListParams, ListQuery, TopBy, TopParams, TopQuery};
pub use schema::SONGS_VERSIONED_SCHEMAS;
pub use store::SqliteSongStore;
pub use trait_def::SongStore;
pub use validation::{validate_new_song, validate_song_patch, ValidationError, ValidationResult};
