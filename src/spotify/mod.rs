pub mod auth;
pub mod client;
pub mod models;

#[cfg(test)]
pub(crate) mod fake;

pub use client::SpotifyClient;
pub use models::*;

use crate::error::Result;
use async_trait::async_trait;

/// The remote calls operations are allowed to make.
///
/// `SpotifyClient` talks to the real Web API; tests swap in an in-memory fake.
/// Values such as volume, seek position or repeat state are forwarded as
/// given: the service is the validation authority.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    async fn devices(&self) -> Result<Vec<Device>>;
    async fn search(&self, query: &str, kind: SearchKind, limit: u32) -> Result<SearchResults>;
    /// `None` when nothing is loaded on any device.
    async fn current_playback(&self) -> Result<Option<Playback>>;

    async fn start_playback(&self, request: PlaybackRequest) -> Result<()>;
    async fn pause(&self) -> Result<()>;
    async fn next_track(&self) -> Result<()>;
    async fn previous_track(&self) -> Result<()>;
    async fn seek(&self, position_ms: i64) -> Result<()>;
    async fn set_volume(&self, percent: i64) -> Result<()>;
    async fn set_shuffle(&self, state: bool) -> Result<()>;
    async fn set_repeat(&self, state: &str) -> Result<()>;
    async fn transfer_playback(&self, device_id: &str, force_play: bool) -> Result<()>;
    async fn add_to_queue(&self, uri: &str) -> Result<()>;

    async fn save_tracks(&self, ids: &[String]) -> Result<()>;
    async fn current_user(&self) -> Result<User>;
    async fn current_user_playlists(&self, limit: u32) -> Result<Vec<Playlist>>;
    async fn create_playlist(&self, user_id: &str, name: &str) -> Result<Playlist>;
    async fn add_playlist_items(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    async fn top_tracks(&self, time_range: &str, limit: u32) -> Result<Vec<Track>>;
    async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures>;
    async fn artist(&self, artist_id: &str) -> Result<ArtistProfile>;
    async fn related_artists(&self, artist_id: &str) -> Result<Vec<Artist>>;
    async fn artist_top_tracks(&self, artist_id: &str) -> Result<Vec<Track>>;
    async fn recommendations(&self, query: &RecommendationQuery) -> Result<Vec<Track>>;
}
