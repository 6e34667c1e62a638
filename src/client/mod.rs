//! Client side of the songs API: an HTTP implementation of [`SongsApi`] and
//! the [`SongsStore`] state container built on top of it.

mod api;
mod store;

pub use api::{ClientError, ClientResult, HttpSongsApi, SongsApi};
pub use store::{
    SongsState, SongsStore, CREATE_SONG_FAILED, DELETE_SONG_FAILED, FETCH_SONGS_FAILED,
    FETCH_STATS_FAILED, UPDATE_SONG_FAILED,
};
