//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per songs API endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET on an arbitrary path, query string included.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET and decode the JSON body, asserting a 200.
    pub async fn get_json(&self, path: &str) -> Value {
        let response = self.get(path).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK, "GET {}", path);
        response.json().await.expect("Response was not JSON")
    }

    // ========================================================================
    // Songs
    // ========================================================================

    pub async fn create_song(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/api/songs", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Create song request failed")
    }

    /// Creates a song from its four fields and returns the stored document.
    pub async fn add_song(&self, title: &str, artist: &str, album: &str, genre: &str) -> Value {
        let response = self
            .create_song(&json!({
                "title": title,
                "artist": artist,
                "album": album,
                "genre": genre,
            }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Created song was not JSON")
    }

    /// Inserts [`SEED_SONGS`] in order and returns the created ids.
    pub async fn seed(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for (title, artist, album, genre) in SEED_SONGS {
            let song = self.add_song(title, artist, album, genre).await;
            ids.push(song["_id"].as_str().expect("Missing _id").to_string());
        }
        ids
    }

    /// Lists songs, `query` being the raw query string without the `?`.
    pub async fn list_songs(&self, query: &str) -> Response {
        if query.is_empty() {
            self.get("/api/songs").await
        } else {
            self.get(&format!("/api/songs?{}", query)).await
        }
    }

    pub async fn get_song(&self, id: &str) -> Response {
        self.get(&format!("/api/songs/{}", id)).await
    }

    pub async fn patch_song(&self, id: &str, body: &Value) -> Response {
        self.client
            .patch(format!("{}/api/songs/{}", self.base_url, id))
            .json(body)
            .send()
            .await
            .expect("Patch song request failed")
    }

    pub async fn delete_song(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/api/songs/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete song request failed")
    }

    // ========================================================================
    // Stats
    // ========================================================================

    pub async fn stats(&self, endpoint: &str) -> Response {
        self.get(&format!("/api/stats/{}", endpoint)).await
    }
}
