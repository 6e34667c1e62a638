//! Client side state for the songs UI.
//!
//! [`SongsStore`] holds the songs list, a loading flag, the last error and the
//! statistics summary. Five flows talk to the API and patch that state:
//! fetch songs, create, update, delete and fetch stats. Mutations refresh the
//! stats once they succeed.
//!
//! Fetches supersede each other: only the most recently issued fetch of a kind
//! may write its result. Mutations run one at a time in the order they were
//! issued. `loading` stays true while any flow is in flight.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use super::api::{ClientError, SongsApi};
use crate::song_store::{ListParams, NewSong, Song, SongId, SongPatch, StatsOverview};

pub const FETCH_SONGS_FAILED: &str = "Failed to fetch songs";
pub const CREATE_SONG_FAILED: &str = "Failed to create song";
pub const UPDATE_SONG_FAILED: &str = "Failed to update song";
pub const DELETE_SONG_FAILED: &str = "Failed to delete song";
pub const FETCH_STATS_FAILED: &str = "Failed to fetch stats";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SongsState {
    pub items: Vec<Song>,
    pub loading: bool,
    pub error: Option<String>,
    pub stats: Option<StatsOverview>,
}

/// Server message when there is one, the flow's fallback otherwise.
fn error_message(err: &ClientError, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_string()
}

pub struct SongsStore {
    api: Arc<dyn SongsApi>,
    state: watch::Sender<SongsState>,
    in_flight: AtomicUsize,
    songs_ticket: AtomicU64,
    stats_ticket: AtomicU64,
    mutations: Mutex<()>,
}

/// A flow counted in `loading`. Dropping it unsettled, e.g. when the flow's
/// future is cancelled, still releases its count.
struct InFlight<'a> {
    store: &'a SongsStore,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, apply: impl FnOnce(&mut SongsState)) {
        self.settled = true;
        self.store.finish(apply);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            debug!("Flow dropped before settling");
            self.store.finish(|_| {});
        }
    }
}

impl SongsStore {
    pub fn new(api: Arc<dyn SongsApi>) -> Self {
        let (state, _) = watch::channel(SongsState::default());
        SongsStore {
            api,
            state,
            in_flight: AtomicUsize::new(0),
            songs_ticket: AtomicU64::new(0),
            stats_ticket: AtomicU64::new(0),
            mutations: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> SongsState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SongsState> {
        self.state.subscribe()
    }

    fn begin(&self) -> InFlight<'_> {
        self.state.send_modify(|state| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            state.loading = true;
            state.error = None;
        });
        InFlight {
            store: self,
            settled: false,
        }
    }

    /// Ends a flow, applying `apply` to the state in the same update.
    fn finish(&self, apply: impl FnOnce(&mut SongsState)) {
        self.state.send_modify(|state| {
            let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            apply(state);
            state.loading = remaining > 0;
        });
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Replaces the songs list with the first page matching `params`.
    pub async fn fetch_songs(&self, params: &ListParams) {
        let ticket = self.songs_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let flight = self.begin();

        let result = self.api.list_songs(params).await;
        let current = self.songs_ticket.load(Ordering::SeqCst) == ticket;
        if !current {
            debug!("Dropping superseded songs fetch #{}", ticket);
        }

        flight.settle(|state| match result {
            _ if !current => {}
            Ok(page) => state.items = page.items,
            Err(err) => {
                warn!("Fetching songs failed: {}", err);
                state.error = Some(error_message(&err, FETCH_SONGS_FAILED));
            }
        });
    }

    pub async fn fetch_stats(&self) {
        let ticket = self.stats_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let flight = self.begin();

        let result = self.api.stats_overview().await;
        let current = self.stats_ticket.load(Ordering::SeqCst) == ticket;
        if !current {
            debug!("Dropping superseded stats fetch #{}", ticket);
        }

        flight.settle(|state| match result {
            _ if !current => {}
            Ok(stats) => state.stats = Some(stats),
            Err(err) => {
                warn!("Fetching stats failed: {}", err);
                state.error = Some(error_message(&err, FETCH_STATS_FAILED));
            }
        });
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates a song and prepends it to the list. Returns the created record.
    pub async fn create_song(&self, song: &NewSong) -> Option<Song> {
        let created = {
            let _guard = self.mutations.lock().await;
            let flight = self.begin();
            match self.api.create_song(song).await {
                Ok(created) => {
                    flight.settle(|state| state.items.insert(0, created.clone()));
                    created
                }
                Err(err) => {
                    warn!("Creating song failed: {}", err);
                    flight.settle(|state| {
                        state.error = Some(error_message(&err, CREATE_SONG_FAILED))
                    });
                    return None;
                }
            }
        };
        self.fetch_stats().await;
        Some(created)
    }

    /// Updates a song and replaces the listed record with the same id.
    pub async fn update_song(&self, id: &SongId, patch: &SongPatch) -> Option<Song> {
        let updated = {
            let _guard = self.mutations.lock().await;
            let flight = self.begin();
            match self.api.update_song(id, patch).await {
                Ok(updated) => {
                    flight.settle(|state| {
                        if let Some(slot) = state.items.iter_mut().find(|s| s.id == updated.id) {
                            *slot = updated.clone();
                        }
                    });
                    updated
                }
                Err(err) => {
                    warn!("Updating song {} failed: {}", id, err);
                    flight.settle(|state| {
                        state.error = Some(error_message(&err, UPDATE_SONG_FAILED))
                    });
                    return None;
                }
            }
        };
        self.fetch_stats().await;
        Some(updated)
    }

    /// Deletes a song and removes it from the list.
    pub async fn delete_song(&self, id: &SongId) -> bool {
        {
            let _guard = self.mutations.lock().await;
            let flight = self.begin();
            match self.api.delete_song(id).await {
                Ok(deleted) => flight.settle(|state| state.items.retain(|s| s.id != deleted)),
                Err(err) => {
                    warn!("Deleting song {} failed: {}", id, err);
                    flight.settle(|state| {
                        state.error = Some(error_message(&err, DELETE_SONG_FAILED))
                    });
                    return false;
                }
            }
        }
        self.fetch_stats().await;
        true
    }
}
