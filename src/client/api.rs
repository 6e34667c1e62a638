//! HTTP client for the songs API.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::song_store::{ListParams, NewSong, Song, SongId, SongPage, SongPatch, StatsOverview};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{}", message.as_deref().unwrap_or("Request failed"))]
    Api { status: u16, message: Option<String> },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// The message sent by the server, if the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Remote operations the client state store depends on.
#[async_trait]
pub trait SongsApi: Send + Sync {
    async fn list_songs(&self, params: &ListParams) -> ClientResult<SongPage>;

    async fn create_song(&self, song: &NewSong) -> ClientResult<Song>;

    async fn update_song(&self, id: &SongId, patch: &SongPatch) -> ClientResult<Song>;

    async fn delete_song(&self, id: &SongId) -> ClientResult<SongId>;

    async fn stats_overview(&self) -> ClientResult<StatsOverview>;
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct DeletedBody {
    id: SongId,
}

/// [`SongsApi`] over HTTP, rooted at the server's base URL
/// (e.g. "http://localhost:3000").
#[derive(Clone)]
pub struct HttpSongsApi {
    client: Client,
    base_url: String,
}

impl HttpSongsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn songs_url(&self) -> String {
        format!("{}/api/songs", self.base_url)
    }

    fn song_url(&self, id: &SongId) -> String {
        format!("{}/api/songs/{}", self.base_url, id)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl SongsApi for HttpSongsApi {
    async fn list_songs(&self, params: &ListParams) -> ClientResult<SongPage> {
        let response = self
            .client
            .get(self.songs_url())
            .query(params)
            .send()
            .await?;
        decode(response).await
    }

    async fn create_song(&self, song: &NewSong) -> ClientResult<Song> {
        let response = self.client.post(self.songs_url()).json(song).send().await?;
        decode(response).await
    }

    async fn update_song(&self, id: &SongId, patch: &SongPatch) -> ClientResult<Song> {
        let response = self
            .client
            .patch(self.song_url(id))
            .json(patch)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_song(&self, id: &SongId) -> ClientResult<SongId> {
        let response = self.client.delete(self.song_url(id)).send().await?;
        let body: DeletedBody = decode(response).await?;
        Ok(body.id)
    }

    async fn stats_overview(&self) -> ClientResult<StatsOverview> {
        let response = self
            .client
            .get(format!("{}/api/stats/overview", self.base_url))
            .send()
            .await?;
        decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let api = HttpSongsApi::new("http://localhost:3000/");
        assert_eq!(api.base_url(), "http://localhost:3000");
        assert_eq!(api.songs_url(), "http://localhost:3000/api/songs");
    }

    #[test]
    fn api_error_displays_server_message() {
        let err = ClientError::Api {
            status: 404,
            message: Some("Song not found".to_string()),
        };
        assert_eq!(err.to_string(), "Song not found");
        assert_eq!(err.server_message(), Some("Song not found"));

        let err = ClientError::Api {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "Request failed");
        assert_eq!(err.server_message(), None);
    }
}
