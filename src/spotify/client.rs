use super::auth::SpotifySession;
use super::models::*;
use super::SpotifyApi;
use crate::config::Config;
use crate::error::{Result, SpotifyError};
use async_trait::async_trait;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Error envelope of the Web API: `{"error": {"status": 404, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Debug, Deserialize)]
struct ArtistsResponse {
    #[serde(default)]
    artists: Vec<Artist>,
}

#[derive(Debug, Deserialize)]
struct TracksResponse {
    #[serde(default)]
    tracks: Vec<Track>,
}

/// Spotify Web API client used by every operation.
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    market: String,
    session: SpotifySession,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            market: config.market.clone(),
            session: SpotifySession::from_config(config),
        })
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {} with {} params", method, url, query.len());

        let token = self.session.access_token(&self.http).await?;
        let mut request = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(token)
            .query(query);

        request = match body {
            Some(body) => request.json(&body),
            // The player endpoints answer 411 to body-less PUT/POST without this.
            None if method != Method::GET => request.header(header::CONTENT_LENGTH, 0),
            None => request,
        };

        let response = request.send().await?;
        self.check_status(response).await
    }

    async fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        warn!("API error ({}): {}", status.as_u16(), message);

        if status == StatusCode::UNAUTHORIZED {
            self.session.invalidate().await;
        }
        Err(SpotifyError::from_status_code(status.as_u16(), message))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.get_optional(path, query)
            .await?
            .ok_or(SpotifyError::MissingField("response body"))
    }

    /// GET that treats `204 No Content` (or an empty body) as `None`.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let response = self.send(Method::GET, path, query, None).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text).map(Some).map_err(|e| {
            warn!("Failed to parse response from {}: {}", path, e);
            SpotifyError::Json(e)
        })
    }

    async fn put(&self, path: &str, query: &[(&str, String)], body: Option<Value>) -> Result<()> {
        self.send(Method::PUT, path, query, body).await?;
        Ok(())
    }

    async fn post(&self, path: &str, query: &[(&str, String)], body: Option<Value>) -> Result<()> {
        self.send(Method::POST, path, query, body).await?;
        Ok(())
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn devices(&self) -> Result<Vec<Device>> {
        let response: DevicesResponse = self.get("/me/player/devices", &[]).await?;
        Ok(response.devices)
    }

    async fn search(&self, query: &str, kind: SearchKind, limit: u32) -> Result<SearchResults> {
        let params = [
            ("q", query.to_string()),
            ("type", kind.as_str().to_string()),
            ("limit", limit.to_string()),
        ];
        self.get("/search", &params).await
    }

    async fn current_playback(&self) -> Result<Option<Playback>> {
        self.get_optional("/me/player", &[]).await
    }

    async fn start_playback(&self, request: PlaybackRequest) -> Result<()> {
        self.put("/me/player/play", &[], request.body()).await
    }

    async fn pause(&self) -> Result<()> {
        self.put("/me/player/pause", &[], None).await
    }

    async fn next_track(&self) -> Result<()> {
        self.post("/me/player/next", &[], None).await
    }

    async fn previous_track(&self) -> Result<()> {
        self.post("/me/player/previous", &[], None).await
    }

    async fn seek(&self, position_ms: i64) -> Result<()> {
        self.put(
            "/me/player/seek",
            &[("position_ms", position_ms.to_string())],
            None,
        )
        .await
    }

    async fn set_volume(&self, percent: i64) -> Result<()> {
        self.put(
            "/me/player/volume",
            &[("volume_percent", percent.to_string())],
            None,
        )
        .await
    }

    async fn set_shuffle(&self, state: bool) -> Result<()> {
        self.put("/me/player/shuffle", &[("state", state.to_string())], None)
            .await
    }

    async fn set_repeat(&self, state: &str) -> Result<()> {
        self.put("/me/player/repeat", &[("state", state.to_string())], None)
            .await
    }

    async fn transfer_playback(&self, device_id: &str, force_play: bool) -> Result<()> {
        let body = json!({ "device_ids": [device_id], "play": force_play });
        self.put("/me/player", &[], Some(body)).await
    }

    async fn add_to_queue(&self, uri: &str) -> Result<()> {
        self.post("/me/player/queue", &[("uri", uri.to_string())], None)
            .await
    }

    async fn save_tracks(&self, ids: &[String]) -> Result<()> {
        self.put("/me/tracks", &[], Some(json!({ "ids": ids }))).await
    }

    async fn current_user(&self) -> Result<User> {
        self.get("/me", &[]).await
    }

    async fn current_user_playlists(&self, limit: u32) -> Result<Vec<Playlist>> {
        let page: Page<Playlist> = self
            .get("/me/playlists", &[("limit", limit.to_string())])
            .await?;
        Ok(page.items)
    }

    async fn create_playlist(&self, user_id: &str, name: &str) -> Result<Playlist> {
        let path = format!("/users/{}/playlists", user_id);
        let body = json!({ "name": name, "public": true });
        let response = self.send(Method::POST, &path, &[], Some(body)).await?;
        Ok(response.json().await?)
    }

    async fn add_playlist_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let path = format!("/playlists/{}/tracks", playlist_id);
        self.post(&path, &[], Some(json!({ "uris": uris }))).await
    }

    async fn top_tracks(&self, time_range: &str, limit: u32) -> Result<Vec<Track>> {
        let params = [
            ("time_range", time_range.to_string()),
            ("limit", limit.to_string()),
        ];
        let page: Page<Track> = self.get("/me/top/tracks", &params).await?;
        Ok(page.items)
    }

    async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures> {
        self.get(&format!("/audio-features/{}", track_id), &[]).await
    }

    async fn artist(&self, artist_id: &str) -> Result<ArtistProfile> {
        self.get(&format!("/artists/{}", artist_id), &[]).await
    }

    async fn related_artists(&self, artist_id: &str) -> Result<Vec<Artist>> {
        let response: ArtistsResponse = self
            .get(&format!("/artists/{}/related-artists", artist_id), &[])
            .await?;
        Ok(response.artists)
    }

    async fn artist_top_tracks(&self, artist_id: &str) -> Result<Vec<Track>> {
        let response: TracksResponse = self
            .get(
                &format!("/artists/{}/top-tracks", artist_id),
                &[("market", self.market.clone())],
            )
            .await?;
        Ok(response.tracks)
    }

    async fn recommendations(&self, query: &RecommendationQuery) -> Result<Vec<Track>> {
        let response: TracksResponse = self.get("/recommendations", &query.query_pairs()).await?;
        Ok(response.tracks)
    }
}
