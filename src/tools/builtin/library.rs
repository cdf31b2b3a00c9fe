use super::{current_track, find_by_name, NOTHING_PLAYING};
use crate::error::Result;
use crate::spotify::{RecommendationQuery, SpotifyApi};
use crate::tools::{Args, Outcome, ParamKind, ParamSpec, Tool};
use async_trait::async_trait;
use std::sync::Arc;

/// Only the first page of the user's playlists is scanned.
const PLAYLIST_SCAN_LIMIT: u32 = 50;
const SEEDED_PLAYLIST_SIZE: u32 = 10;

pub struct SaveCurrentTrackTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for SaveCurrentTrackTool {
    fn name(&self) -> &str {
        "guardar_en_favoritos"
    }
    fn description(&self) -> &str {
        "Guarda (Me gusta) la canción actual en tu biblioteca."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        let Some(track) = current_track(self.api.as_ref()).await? else {
            return Ok(Outcome::empty(NOTHING_PLAYING));
        };

        self.api
            .save_tracks(&[track.track_id()?.to_string()])
            .await?;
        Ok(Outcome::success(format!("Guardada: {}", track.name)))
    }
}

pub struct PlaylistFromCurrentTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for PlaylistFromCurrentTool {
    fn name(&self) -> &str {
        "crear_playlist_basada_en_actual"
    }
    fn description(&self) -> &str {
        "Crea una playlist NUEVA con recomendaciones basadas en lo que suena ahora."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "nombre_playlist",
            ParamKind::String,
            "Nombre de la playlist nueva",
        )]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let name = args.string("nombre_playlist")?;
        let Some(track) = current_track(self.api.as_ref()).await? else {
            return Ok(Outcome::empty(NOTHING_PLAYING));
        };

        let user = self.api.current_user().await?;
        let query = RecommendationQuery::seeded_by_track(track.track_id()?, SEEDED_PLAYLIST_SIZE);
        let uris: Vec<String> = self
            .api
            .recommendations(&query)
            .await?
            .into_iter()
            .map(|t| t.uri)
            .collect();

        // A failed append leaves the new playlist in place, partially filled or empty.
        let playlist = self.api.create_playlist(&user.id, name).await?;
        if uris.is_empty() {
            tracing::warn!("No recommendations for playlist '{}', leaving it empty", name);
        } else {
            self.api.add_playlist_items(&playlist.id, &uris).await?;
        }
        Ok(Outcome::success(format!(
            "Playlist '{}' creada con éxito.",
            name
        )))
    }
}

pub struct AddToPlaylistTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for AddToPlaylistTool {
    fn name(&self) -> &str {
        "agregar_a_playlist_existente"
    }
    fn description(&self) -> &str {
        "Busca una de tus playlists por nombre y le agrega la canción actual."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "nombre_playlist",
            ParamKind::String,
            "Parte del nombre de la playlist",
        )]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let wanted = args.string("nombre_playlist")?;
        let Some(track) = current_track(self.api.as_ref()).await? else {
            return Ok(Outcome::empty(NOTHING_PLAYING));
        };

        let playlists = self.api.current_user_playlists(PLAYLIST_SCAN_LIMIT).await?;
        let Some(playlist) = find_by_name(&playlists, wanted, |p| p.name.as_str()) else {
            return Ok(Outcome::empty(format!(
                "No encontré playlist llamada '{}'.",
                wanted
            )));
        };

        self.api
            .add_playlist_items(&playlist.id, &[track.uri.clone()])
            .await?;
        Ok(Outcome::success(format!("Agregada a '{}'.", playlist.name)))
    }
}
