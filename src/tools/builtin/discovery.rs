use super::{current_track, NOTHING_PLAYING};
use crate::error::Result;
use crate::spotify::{PlaybackRequest, RecommendationQuery, SpotifyApi};
use crate::tools::{Args, Outcome, ParamKind, ParamSpec, Tool};
use async_trait::async_trait;
use std::sync::Arc;

const RADIO_ARTISTS: usize = 5;
const RADIO_TRACKS_PER_ARTIST: usize = 2;
const MIX_SIZE: u32 = 20;

pub struct SimilarArtistsRadioTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for SimilarArtistsRadioTool {
    fn name(&self) -> &str {
        "radio_artistas_similares"
    }
    fn description(&self) -> &str {
        "Crea una sesión con artistas similares al que suena ahora."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        let Some(track) = current_track(self.api.as_ref()).await? else {
            return Ok(Outcome::empty(NOTHING_PLAYING));
        };
        let seed = track.primary_artist()?;

        let related = self.api.related_artists(seed.artist_id()?).await?;
        if related.is_empty() {
            return Ok(Outcome::empty("No hay artistas relacionados."));
        }

        // Order: relatedness rank, then each artist's own top-track rank.
        let mut uris = Vec::new();
        let mut names = Vec::new();
        for artist in related.iter().take(RADIO_ARTISTS) {
            names.push(artist.name.as_str());
            let top = self.api.artist_top_tracks(artist.artist_id()?).await?;
            uris.extend(
                top.into_iter()
                    .take(RADIO_TRACKS_PER_ARTIST)
                    .map(|t| t.uri),
            );
        }

        if uris.is_empty() {
            return Ok(Outcome::empty(
                "Los artistas relacionados no tienen canciones disponibles.",
            ));
        }

        self.api.start_playback(PlaybackRequest::Uris(uris)).await?;
        Ok(Outcome::success(format!(
            "Radio basada en {} (Similares: {})",
            seed.name,
            names.join(", ")
        )))
    }
}

pub struct RecommendByParamsTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for RecommendByParamsTool {
    fn name(&self) -> &str {
        "recomendar_por_parametros"
    }
    fn description(&self) -> &str {
        "Reproduce recomendaciones de un género ajustando energía y felicidad (0.0 a 1.0). Ej: energia=0.9, felicidad=0.2."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("genero", ParamKind::String, "Género semilla, ej: 'rock'"),
            ParamSpec::optional("energia", ParamKind::Float, "Energía objetivo entre 0.0 y 1.0"),
            ParamSpec::optional(
                "felicidad",
                ParamKind::Float,
                "Valencia (felicidad) objetivo entre 0.0 y 1.0",
            ),
        ]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let genre = args.string("genero")?;
        let query = RecommendationQuery {
            target_energy: args.opt_float("energia"),
            target_valence: args.opt_float("felicidad"),
            ..RecommendationQuery::seeded_by_genre(genre, MIX_SIZE)
        };

        let tracks = self.api.recommendations(&query).await?;
        if tracks.is_empty() {
            return Ok(Outcome::empty("Sin resultados."));
        }

        let uris = tracks.into_iter().map(|t| t.uri).collect();
        self.api.start_playback(PlaybackRequest::Uris(uris)).await?;
        Ok(Outcome::success(format!("Mix {} personalizado.", genre)))
    }
}
