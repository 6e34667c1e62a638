use axum::extract::FromRef;
use std::sync::Arc;

use crate::song_store::SongStore;

use super::ServerConfig;

pub type GuardedSongStore = Arc<dyn SongStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub song_store: GuardedSongStore,
}

impl ServerState {
    pub fn new(config: ServerConfig, song_store: GuardedSongStore) -> Self {
        ServerState { config, song_store }
    }
}

impl FromRef<ServerState> for GuardedSongStore {
    fn from_ref(input: &ServerState) -> Self {
        input.song_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
