//! In-memory `SpotifyApi` for handler tests. Canned responses go in the
//! public fields; every call is recorded in order.

use super::models::*;
use super::SpotifyApi;
use crate::error::{Result, SpotifyError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Devices,
    Search { query: String, kind: SearchKind, limit: u32 },
    CurrentPlayback,
    StartPlayback(PlaybackRequest),
    Pause,
    Next,
    Previous,
    Seek(i64),
    Volume(i64),
    Shuffle(bool),
    Repeat(String),
    Transfer { device_id: String, force_play: bool },
    Queue(String),
    SaveTracks(Vec<String>),
    CurrentUser,
    Playlists(u32),
    CreatePlaylist { user_id: String, name: String },
    AddPlaylistItems { playlist_id: String, uris: Vec<String> },
    TopTracks { time_range: String, limit: u32 },
    AudioFeatures(String),
    Artist(String),
    RelatedArtists(String),
    ArtistTopTracks(String),
    Recommendations(RecommendationQuery),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::StartPlayback(_)
                | Call::Pause
                | Call::Next
                | Call::Previous
                | Call::Seek(_)
                | Call::Volume(_)
                | Call::Shuffle(_)
                | Call::Repeat(_)
                | Call::Transfer { .. }
                | Call::Queue(_)
                | Call::SaveTracks(_)
                | Call::CreatePlaylist { .. }
                | Call::AddPlaylistItems { .. }
        )
    }
}

#[derive(Default)]
pub struct FakeSpotify {
    pub devices: Vec<Device>,
    pub search_results: SearchResults,
    pub playback: Option<Playback>,
    pub user: Option<User>,
    pub playlists: Vec<Playlist>,
    pub top_tracks: Vec<Track>,
    pub features: Option<AudioFeatures>,
    pub profile: Option<ArtistProfile>,
    pub related: Vec<Artist>,
    pub artist_tracks: HashMap<String, Vec<Track>>,
    pub recommended: Vec<Track>,
    /// When set, every call fails with this message.
    pub failure: Option<String>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeSpotify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(message) => Err(SpotifyError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: Some(id.to_string()),
        uri: format!("spotify:artist:{}", id),
        name: name.to_string(),
    }
}

pub fn track(id: &str, name: &str, artist_name: &str) -> Track {
    Track {
        id: Some(id.to_string()),
        uri: format!("spotify:track:{}", id),
        name: name.to_string(),
        artists: vec![artist(&format!("{}-artist", id), artist_name)],
        duration_ms: 200_000,
    }
}

pub fn device(id: &str, name: &str, kind: &str) -> Device {
    Device {
        id: Some(id.to_string()),
        name: name.to_string(),
        kind: kind.to_string(),
        is_active: false,
        volume_percent: Some(50),
    }
}

pub fn playback_of(item: Track) -> Playback {
    Playback {
        device: None,
        item: Some(item),
        progress_ms: Some(0),
        is_playing: true,
        shuffle_state: false,
        repeat_state: Some("off".to_string()),
    }
}

pub fn playlist(id: &str, name: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        owner: None,
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn devices(&self) -> Result<Vec<Device>> {
        self.record(Call::Devices)?;
        Ok(self.devices.clone())
    }

    async fn search(&self, query: &str, kind: SearchKind, limit: u32) -> Result<SearchResults> {
        self.record(Call::Search {
            query: query.to_string(),
            kind,
            limit,
        })?;
        Ok(self.search_results.clone())
    }

    async fn current_playback(&self) -> Result<Option<Playback>> {
        self.record(Call::CurrentPlayback)?;
        Ok(self.playback.clone())
    }

    async fn start_playback(&self, request: PlaybackRequest) -> Result<()> {
        self.record(Call::StartPlayback(request))
    }

    async fn pause(&self) -> Result<()> {
        self.record(Call::Pause)
    }

    async fn next_track(&self) -> Result<()> {
        self.record(Call::Next)
    }

    async fn previous_track(&self) -> Result<()> {
        self.record(Call::Previous)
    }

    async fn seek(&self, position_ms: i64) -> Result<()> {
        self.record(Call::Seek(position_ms))
    }

    async fn set_volume(&self, percent: i64) -> Result<()> {
        self.record(Call::Volume(percent))
    }

    async fn set_shuffle(&self, state: bool) -> Result<()> {
        self.record(Call::Shuffle(state))
    }

    async fn set_repeat(&self, state: &str) -> Result<()> {
        self.record(Call::Repeat(state.to_string()))
    }

    async fn transfer_playback(&self, device_id: &str, force_play: bool) -> Result<()> {
        self.record(Call::Transfer {
            device_id: device_id.to_string(),
            force_play,
        })
    }

    async fn add_to_queue(&self, uri: &str) -> Result<()> {
        self.record(Call::Queue(uri.to_string()))
    }

    async fn save_tracks(&self, ids: &[String]) -> Result<()> {
        self.record(Call::SaveTracks(ids.to_vec()))
    }

    async fn current_user(&self) -> Result<User> {
        self.record(Call::CurrentUser)?;
        self.user
            .clone()
            .ok_or_else(|| SpotifyError::NotFound("user".to_string()))
    }

    async fn current_user_playlists(&self, limit: u32) -> Result<Vec<Playlist>> {
        self.record(Call::Playlists(limit))?;
        Ok(self.playlists.iter().take(limit as usize).cloned().collect())
    }

    async fn create_playlist(&self, user_id: &str, name: &str) -> Result<Playlist> {
        self.record(Call::CreatePlaylist {
            user_id: user_id.to_string(),
            name: name.to_string(),
        })?;
        Ok(playlist("new-playlist", name))
    }

    async fn add_playlist_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.record(Call::AddPlaylistItems {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        })
    }

    async fn top_tracks(&self, time_range: &str, limit: u32) -> Result<Vec<Track>> {
        self.record(Call::TopTracks {
            time_range: time_range.to_string(),
            limit,
        })?;
        Ok(self.top_tracks.clone())
    }

    async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures> {
        self.record(Call::AudioFeatures(track_id.to_string()))?;
        self.features
            .clone()
            .ok_or_else(|| SpotifyError::NotFound("audio features".to_string()))
    }

    async fn artist(&self, artist_id: &str) -> Result<ArtistProfile> {
        self.record(Call::Artist(artist_id.to_string()))?;
        self.profile
            .clone()
            .ok_or_else(|| SpotifyError::NotFound("artist".to_string()))
    }

    async fn related_artists(&self, artist_id: &str) -> Result<Vec<Artist>> {
        self.record(Call::RelatedArtists(artist_id.to_string()))?;
        Ok(self.related.clone())
    }

    async fn artist_top_tracks(&self, artist_id: &str) -> Result<Vec<Track>> {
        self.record(Call::ArtistTopTracks(artist_id.to_string()))?;
        Ok(self.artist_tracks.get(artist_id).cloned().unwrap_or_default())
    }

    async fn recommendations(&self, query: &RecommendationQuery) -> Result<Vec<Track>> {
        self.record(Call::Recommendations(query.clone()))?;
        Ok(self.recommended.clone())
    }
}
