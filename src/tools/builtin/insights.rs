use super::{current_track, group_thousands, NOTHING_PLAYING};
use crate::error::Result;
use crate::spotify::SpotifyApi;
use crate::tools::{Args, Outcome, ParamKind, ParamSpec, Tool};
use async_trait::async_trait;
use std::sync::Arc;

const TOP_TRACKS_LIMIT: u32 = 10;

pub struct TopTracksTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for TopTracksTool {
    fn name(&self) -> &str {
        "mis_top_canciones"
    }
    fn description(&self) -> &str {
        "Tus canciones más escuchadas (short_term, medium_term, long_term)."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "plazo",
            ParamKind::String,
            "'short_term' (4 semanas), 'medium_term' (6 meses) o 'long_term' (años)",
        )
        .with_default("short_term")]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let range = args.string("plazo")?;
        let tracks = self.api.top_tracks(range, TOP_TRACKS_LIMIT).await?;

        let mut lines = vec![format!("Top Tracks ({}):", range)];
        for (i, track) in tracks.iter().enumerate() {
            lines.push(format!(
                "{}. {} - {}",
                i + 1,
                track.name,
                track.primary_artist()?.name
            ));
        }
        Ok(Outcome::success(lines.join("\n")))
    }
}

pub struct TrackAnalysisTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for TrackAnalysisTool {
    fn name(&self) -> &str {
        "obtener_analisis_cancion"
    }
    fn description(&self) -> &str {
        "Datos técnicos de la canción actual: BPM, energía, bailabilidad, valencia."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        let Some(track) = current_track(self.api.as_ref()).await? else {
            return Ok(Outcome::empty(NOTHING_PLAYING));
        };

        let f = self.api.audio_features(track.track_id()?).await?;
        Ok(Outcome::success(format!(
            "Análisis '{}':\nBPM: {}, Energía: {}, Dance: {}, Valence: {}",
            track.name, f.tempo, f.energy, f.danceability, f.valence
        )))
    }
}

pub struct ArtistInfoTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for ArtistInfoTool {
    fn name(&self) -> &str {
        "obtener_info_artista"
    }
    fn description(&self) -> &str {
        "Información del artista actual: seguidores, popularidad y géneros."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        let Some(track) = current_track(self.api.as_ref()).await? else {
            return Ok(Outcome::empty(NOTHING_PLAYING));
        };

        let artist_id = track.primary_artist()?.artist_id()?;
        let artist = self.api.artist(artist_id).await?;
        let genres = if artist.genres.is_empty() {
            "N/A".to_string()
        } else {
            artist.genres.join(", ")
        };

        Ok(Outcome::success(format!(
            "Artista: {}\nSeguidores: {}\nPop: {}/100\nGéneros: {}",
            artist.name,
            group_thousands(artist.followers.total),
            artist.popularity,
            genres
        )))
    }
}
