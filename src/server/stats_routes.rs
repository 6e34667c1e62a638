use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::error::{ApiError, ApiResult};
use super::server::route_not_found;
use super::state::{GuardedSongStore, ServerState};
use crate::song_store::{
    AlbumStats, ArtistStats, GenreStats, StatsOverview, TopList, TopParams, TopQuery,
};

async fn get_overview(State(store): State<GuardedSongStore>) -> ApiResult<Json<StatsOverview>> {
    store
        .stats_overview()
        .map(Json)
        .map_err(ApiError::store("Failed to compute overview"))
}

async fn get_genres(State(store): State<GuardedSongStore>) -> ApiResult<Json<Vec<GenreStats>>> {
    store
        .stats_by_genre()
        .map(Json)
        .map_err(ApiError::store("Failed to compute genre stats"))
}

async fn get_artists(State(store): State<GuardedSongStore>) -> ApiResult<Json<Vec<ArtistStats>>> {
    store
        .stats_by_artist()
        .map(Json)
        .map_err(ApiError::store("Failed to compute artist stats"))
}

async fn get_albums(State(store): State<GuardedSongStore>) -> ApiResult<Json<Vec<AlbumStats>>> {
    store
        .stats_by_album()
        .map(Json)
        .map_err(ApiError::store("Failed to compute album stats"))
}

async fn get_top(
    State(store): State<GuardedSongStore>,
    Query(params): Query<TopParams>,
) -> ApiResult<Json<TopList>> {
    let top = TopQuery::from_params(&params)?;
    store
        .top(top.by, top.limit)
        .map(Json)
        .map_err(ApiError::store("Failed to compute top list"))
}

pub fn make_stats_routes(state: ServerState) -> Router {
    Router::new()
        .route("/overview", get(get_overview))
        .route("/genres", get(get_genres))
        .route("/artists", get(get_artists))
        .route("/albums", get(get_albums))
        .route("/top", get(get_top))
        .method_not_allowed_fallback(route_not_found)
        .with_state(state)
}
