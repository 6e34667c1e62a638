use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::server::route_not_found;
use super::state::{GuardedSongStore, ServerState};
use crate::song_store::{
    validate_new_song, validate_song_patch, ListParams, ListQuery, Song, SongId, SongPage,
};

#[derive(Serialize, Debug)]
struct DeletedResponse {
    message: &'static str,
    id: SongId,
}

fn parse_song_id(raw: &str) -> ApiResult<SongId> {
    raw.parse().map_err(|_| ApiError::InvalidId)
}

async fn create_song(
    State(store): State<GuardedSongStore>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let song = validate_new_song(&body)?;
    let created = store
        .create_song(&song)
        .map_err(ApiError::store("Failed to create song"))?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_songs(
    State(store): State<GuardedSongStore>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<SongPage>> {
    let query = ListQuery::from_params(&params);
    debug!("Listing songs with {:?}", query);
    let page = store
        .list_songs(&query)
        .map_err(ApiError::store("Failed to list songs"))?;
    Ok(Json(page))
}

async fn get_song(
    State(store): State<GuardedSongStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<Song>> {
    let id = parse_song_id(&id)?;
    match store
        .get_song(&id)
        .map_err(ApiError::store("Failed to fetch song"))?
    {
        Some(song) => Ok(Json(song)),
        None => Err(ApiError::NotFound),
    }
}

async fn update_song(
    State(store): State<GuardedSongStore>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Song>> {
    let id = parse_song_id(&id)?;
    let Json(body) = body?;
    let patch = validate_song_patch(&body)?;
    match store
        .update_song(&id, &patch)
        .map_err(ApiError::store("Failed to update song"))?
    {
        Some(song) => Ok(Json(song)),
        None => Err(ApiError::NotFound),
    }
}

async fn delete_song(
    State(store): State<GuardedSongStore>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeletedResponse>> {
    let id = parse_song_id(&id)?;
    match store
        .delete_song(&id)
        .map_err(ApiError::store("Failed to delete song"))?
    {
        Some(id) => Ok(Json(DeletedResponse {
            message: "Deleted",
            id,
        })),
        None => Err(ApiError::NotFound),
    }
}

pub fn make_songs_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_songs).post(create_song))
        .route(
            "/{id}",
            get(get_song).patch(update_song).delete(delete_song),
        )
        .method_not_allowed_fallback(route_not_found)
        .with_state(state)
}
