//! Wire models for the subset of the Spotify Web API this server touches.
//!
//! Only the fields the operations read are modelled; everything else in the
//! payloads is ignored by serde.

use crate::error::{Result, SpotifyError};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Spotify sometimes returns `null` entries inside item arrays (removed
/// episodes, unavailable tracks). Those are dropped on the way in.
fn skip_nulls<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "skip_nulls")]
    pub items: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub volume_percent: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
    #[serde(default = "Vec::new", deserialize_with = "skip_nulls")]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Track {
    /// Local files have no catalog id.
    #[serde(default)]
    pub id: Option<String>,
    pub uri: String,
    pub name: String,
    #[serde(default = "Vec::new", deserialize_with = "skip_nulls")]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub duration_ms: u64,
}

impl Track {
    pub fn track_id(&self) -> Result<&str> {
        self.id.as_deref().ok_or(SpotifyError::MissingField("track.id"))
    }

    pub fn primary_artist(&self) -> Result<&Artist> {
        self.artists
            .first()
            .ok_or(SpotifyError::MissingField("track.artists"))
    }
}

impl Artist {
    pub fn artist_id(&self) -> Result<&str> {
        self.id.as_deref().ok_or(SpotifyError::MissingField("artist.id"))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Show {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Episode {
    pub id: String,
    pub uri: String,
    pub name: String,
    /// Absent on the simplified episodes returned by search.
    #[serde(default)]
    pub show: Option<Show>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Playback {
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub item: Option<Track>,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub shuffle_state: bool,
    #[serde(default)]
    pub repeat_state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioFeatures {
    pub tempo: f64,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArtistProfile {
    pub name: String,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub genres: Vec<String>,
    pub followers: Followers,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Track,
    Album,
    Artist,
    Episode,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Track => "track",
            SearchKind::Album => "album",
            SearchKind::Artist => "artist",
            SearchKind::Episode => "episode",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchKind {
    type Err = SpotifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "track" => Ok(SearchKind::Track),
            "album" => Ok(SearchKind::Album),
            "artist" => Ok(SearchKind::Artist),
            "episode" => Ok(SearchKind::Episode),
            other => Err(SpotifyError::InvalidArgument(format!(
                "unknown search type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub tracks: Option<Page<Track>>,
    #[serde(default)]
    pub albums: Option<Page<Album>>,
    #[serde(default)]
    pub artists: Option<Page<Artist>>,
    #[serde(default)]
    pub episodes: Option<Page<Episode>>,
}

/// Something playback can start from as a whole: an album or an artist.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRef<'a> {
    pub uri: &'a str,
    pub name: &'a str,
}

impl SearchResults {
    pub fn tracks(&self) -> &[Track] {
        self.tracks.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    pub fn episodes(&self) -> &[Episode] {
        self.episodes.as_ref().map(|p| p.items.as_slice()).unwrap_or(&[])
    }

    pub fn first_context(&self, kind: SearchKind) -> Result<Option<ContextRef<'_>>> {
        let first = match kind {
            SearchKind::Album => self
                .albums
                .as_ref()
                .and_then(|p| p.items.first())
                .map(|a| ContextRef { uri: &a.uri, name: &a.name }),
            SearchKind::Artist => self
                .artists
                .as_ref()
                .and_then(|p| p.items.first())
                .map(|a| ContextRef { uri: &a.uri, name: &a.name }),
            other => {
                return Err(SpotifyError::InvalidArgument(format!(
                    "'{}' cannot be played as a context, use 'album' or 'artist'",
                    other
                )))
            }
        };
        Ok(first)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackRequest {
    /// Continue whatever is loaded on the active device.
    Resume,
    Uris(Vec<String>),
    Context(String),
}

impl PlaybackRequest {
    pub fn body(&self) -> Option<Value> {
        match self {
            PlaybackRequest::Resume => None,
            PlaybackRequest::Uris(uris) => Some(json!({ "uris": uris })),
            PlaybackRequest::Context(uri) => Some(json!({ "context_uri": uri })),
        }
    }
}

/// Query for `/recommendations`. Targets are only sent when set, so an
/// explicit `0.0` reaches the service as a real target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationQuery {
    pub seed_tracks: Vec<String>,
    pub seed_genres: Vec<String>,
    pub limit: u32,
    pub target_energy: Option<f64>,
    pub target_valence: Option<f64>,
}

impl RecommendationQuery {
    pub fn seeded_by_track(track_id: impl Into<String>, limit: u32) -> Self {
        Self {
            seed_tracks: vec![track_id.into()],
            limit,
            ..Default::default()
        }
    }

    pub fn seeded_by_genre(genre: impl Into<String>, limit: u32) -> Self {
        Self {
            seed_genres: vec![genre.into()],
            limit,
            ..Default::default()
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];
        if !self.seed_tracks.is_empty() {
            pairs.push(("seed_tracks", self.seed_tracks.join(",")));
        }
        if !self.seed_genres.is_empty() {
            pairs.push(("seed_genres", self.seed_genres.join(",")));
        }
        if let Some(energy) = self.target_energy {
            pairs.push(("target_energy", energy.to_string()));
        }
        if let Some(valence) = self.target_valence {
            pairs.push(("target_valence", valence.to_string()));
        }
        pairs
    }
}
