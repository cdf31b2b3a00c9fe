use super::{find_by_name, format_clock, NOTHING_PLAYING};
use crate::error::{Result, SpotifyError};
use crate::spotify::{PlaybackRequest, SearchKind, SpotifyApi};
use crate::tools::{Args, Outcome, ParamKind, ParamSpec, Tool};
use async_trait::async_trait;
use std::sync::Arc;

pub struct ListDevicesTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for ListDevicesTool {
    fn name(&self) -> &str {
        "listar_dispositivos"
    }
    fn description(&self) -> &str {
        "Muestra los dispositivos de Spotify disponibles. Útil si la música no suena."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        let devices = self.api.devices().await?;
        if devices.is_empty() {
            return Ok(Outcome::empty(
                "No hay dispositivos activos. Abre Spotify en tu celular o PC.",
            ));
        }

        let lines: Vec<String> = devices
            .iter()
            .map(|d| {
                format!(
                    "- {} ({}) ID: {}",
                    d.name,
                    d.kind,
                    d.id.as_deref().unwrap_or("N/A")
                )
            })
            .collect();
        Ok(Outcome::success(lines.join("\n")))
    }
}

pub struct PlayTrackTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for PlayTrackTool {
    fn name(&self) -> &str {
        "reproducir_musica"
    }
    fn description(&self) -> &str {
        "Busca una canción concreta y la reproduce."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "busqueda",
            ParamKind::String,
            "Título de la canción, opcionalmente con el artista",
        )]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let query = args.string("busqueda")?;
        let results = self.api.search(query, SearchKind::Track, 1).await?;
        let Some(track) = results.tracks().first() else {
            return Ok(Outcome::empty(format!("No encontré: {}", query)));
        };

        let artist = track.primary_artist()?;
        self.api
            .start_playback(PlaybackRequest::Uris(vec![track.uri.clone()]))
            .await?;
        Ok(Outcome::success(format!(
            "Reproduciendo: {} - {}",
            track.name, artist.name
        )))
    }
}

pub struct PauseTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for PauseTool {
    fn name(&self) -> &str {
        "pausar_musica"
    }
    fn description(&self) -> &str {
        "Pausa la reproducción."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        self.api.pause().await?;
        Ok(Outcome::success("Pausado."))
    }
}

pub struct ResumeTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for ResumeTool {
    fn name(&self) -> &str {
        "reanudar_musica"
    }
    fn description(&self) -> &str {
        "Reanuda la reproducción donde se quedó."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        self.api.start_playback(PlaybackRequest::Resume).await?;
        Ok(Outcome::success("Reproduciendo."))
    }
}

pub struct NextTrackTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for NextTrackTool {
    fn name(&self) -> &str {
        "siguiente_cancion"
    }
    fn description(&self) -> &str {
        "Salta a la siguiente canción."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        self.api.next_track().await?;
        Ok(Outcome::success("Siguiente pista..."))
    }
}

pub struct PreviousTrackTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for PreviousTrackTool {
    fn name(&self) -> &str {
        "cancion_anterior"
    }
    fn description(&self) -> &str {
        "Vuelve a la canción anterior."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        self.api.previous_track().await?;
        Ok(Outcome::success("Pista anterior..."))
    }
}

pub struct VolumeTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for VolumeTool {
    fn name(&self) -> &str {
        "cambiar_volumen"
    }
    fn description(&self) -> &str {
        "Cambia el volumen (0-100)."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "porcentaje",
            ParamKind::Integer,
            "Volumen entre 0 y 100",
        )]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let percent = args.integer("porcentaje")?;
        self.api.set_volume(percent).await?;
        Ok(Outcome::success(format!("Volumen al {}%.", percent)))
    }
}

pub struct SeekTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for SeekTool {
    fn name(&self) -> &str {
        "saltar_a_segundo"
    }
    fn description(&self) -> &str {
        "Salta al segundo indicado de la canción actual."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "segundos",
            ParamKind::Integer,
            "Posición en segundos",
        )]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let seconds = args.integer("segundos")?;
        let position_ms = seconds
            .checked_mul(1000)
            .ok_or_else(|| SpotifyError::InvalidArgument(format!("{} s is out of range", seconds)))?;
        self.api.seek(position_ms).await?;
        Ok(Outcome::success(format!("Saltando al segundo {}.", seconds)))
    }
}

pub struct TransferPlaybackTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for TransferPlaybackTool {
    fn name(&self) -> &str {
        "transferir_musica_a_dispositivo"
    }
    fn description(&self) -> &str {
        "Mueve la música a otro dispositivo (ej: 'iPhone', 'PC')."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "nombre_dispositivo",
            ParamKind::String,
            "Parte del nombre del dispositivo",
        )]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let wanted = args.string("nombre_dispositivo")?;
        let devices = self.api.devices().await?;
        let Some(device) = find_by_name(&devices, wanted, |d| d.name.as_str()) else {
            return Ok(Outcome::empty(format!("No encontré '{}'.", wanted)));
        };

        let device_id = device
            .id
            .as_deref()
            .ok_or(SpotifyError::MissingField("device.id"))?;
        self.api.transfer_playback(device_id, true).await?;
        Ok(Outcome::success(format!("Música movida a: {}", device.name)))
    }
}

pub struct QueueTrackTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for QueueTrackTool {
    fn name(&self) -> &str {
        "agregar_a_fila"
    }
    fn description(&self) -> &str {
        "Agrega una canción a la cola de reproducción."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "busqueda",
            ParamKind::String,
            "Canción a buscar",
        )]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let query = args.string("busqueda")?;
        let results = self.api.search(query, SearchKind::Track, 1).await?;
        let Some(track) = results.tracks().first() else {
            return Ok(Outcome::empty("No encontrado."));
        };

        self.api.add_to_queue(&track.uri).await?;
        Ok(Outcome::success(format!("En cola: {}", track.name)))
    }
}

pub struct PlayContextTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for PlayContextTool {
    fn name(&self) -> &str {
        "reproducir_contexto"
    }
    fn description(&self) -> &str {
        "Reproduce un ÁLBUM o ARTISTA completo. tipo='album' o 'artist'."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("busqueda", ParamKind::String, "Álbum o artista a buscar"),
            ParamSpec::required("tipo", ParamKind::String, "'album' o 'artist'")
                .with_default("album"),
        ]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let query = args.string("busqueda")?;
        let kind_name = args.string("tipo")?;
        let kind: SearchKind = kind_name.parse()?;

        let results = self.api.search(query, kind, 1).await?;
        let Some(context) = results.first_context(kind)? else {
            return Ok(Outcome::empty(format!("No encontré ese {}.", kind_name)));
        };

        self.api
            .start_playback(PlaybackRequest::Context(context.uri.to_string()))
            .await?;
        Ok(Outcome::success(format!(
            "Reproduciendo {}: {}",
            kind_name, context.name
        )))
    }
}

pub struct PlaybackModeTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for PlaybackModeTool {
    fn name(&self) -> &str {
        "cambiar_modo_reproduccion"
    }
    fn description(&self) -> &str {
        "Configura el modo aleatorio (true/false) y la repetición ('track', 'context', 'off')."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("aleatorio", ParamKind::Boolean, "Activar modo aleatorio")
                .with_default(false),
            ParamSpec::required("repetir", ParamKind::String, "'track', 'context' u 'off'")
                .with_default("off"),
        ]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let shuffle = args.boolean("aleatorio")?;
        let repeat = args.string("repetir")?;

        self.api.set_shuffle(shuffle).await?;
        self.api.set_repeat(repeat).await?;
        Ok(Outcome::success(format!(
            "Modo: Shuffle={}, Repeat={}",
            shuffle, repeat
        )))
    }
}

pub struct PlayPodcastTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for PlayPodcastTool {
    fn name(&self) -> &str {
        "reproducir_podcast"
    }
    fn description(&self) -> &str {
        "Busca y reproduce un episodio de podcast."
    }
    fn params(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required(
            "busqueda",
            ParamKind::String,
            "Episodio o programa a buscar",
        )]
    }
    async fn execute(&self, args: &Args) -> Result<Outcome> {
        let query = args.string("busqueda")?;
        let results = self.api.search(query, SearchKind::Episode, 1).await?;
        let Some(episode) = results.episodes().first() else {
            return Ok(Outcome::empty("No encontré podcasts."));
        };

        self.api
            .start_playback(PlaybackRequest::Uris(vec![episode.uri.clone()]))
            .await?;
        let message = match &episode.show {
            Some(show) => format!("Podcast: {} ({})", episode.name, show.name),
            None => format!("Podcast: {}", episode.name),
        };
        Ok(Outcome::success(message))
    }
}

pub struct NowPlayingTool {
    pub api: Arc<dyn SpotifyApi>,
}

#[async_trait]
impl Tool for NowPlayingTool {
    fn name(&self) -> &str {
        "que_suena"
    }
    fn description(&self) -> &str {
        "Dice qué canción está sonando y en qué punto va."
    }
    async fn execute(&self, _args: &Args) -> Result<Outcome> {
        let Some(playback) = self.api.current_playback().await? else {
            return Ok(Outcome::empty(NOTHING_PLAYING));
        };
        let Some(track) = playback.item.as_ref() else {
            return Ok(Outcome::empty(NOTHING_PLAYING));
        };

        let label = if playback.is_playing { "Sonando" } else { "En pausa" };
        Ok(Outcome::success(format!(
            "{}: {} - {} ({}/{})",
            label,
            track.name,
            track.primary_artist()?.name,
            format_clock(playback.progress_ms.unwrap_or(0)),
            format_clock(track.duration_ms)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::fake::{device, playback_of, track, Call, FakeSpotify};
    use crate::spotify::{Album, Artist, Episode, Page, SearchResults};
    use serde_json::json;

    fn tracks_result(items: Vec<crate::spotify::Track>) -> SearchResults {
        SearchResults {
            tracks: Some(Page { items }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_play_track_end_to_end() {
        let fake = Arc::new(FakeSpotify {
            search_results: tracks_result(vec![track("bohemian", "Bohemian Rhapsody", "Queen")]),
            ..FakeSpotify::new()
        });
        let tool = PlayTrackTool { api: fake.clone() };
        let args = Args::from_pairs([("busqueda", json!("Bohemian Rhapsody"))]);

        let outcome = tool.execute(&args).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::success("Reproduciendo: Bohemian Rhapsody - Queen")
        );
        assert_eq!(
            fake.mutations(),
            vec![Call::StartPlayback(PlaybackRequest::Uris(vec![
                "spotify:track:bohemian".to_string()
            ]))]
        );
        assert_eq!(
            fake.calls()[0],
            Call::Search {
                query: "Bohemian Rhapsody".to_string(),
                kind: SearchKind::Track,
                limit: 1
            }
        );
    }

    #[tokio::test]
    async fn test_empty_search_never_mutates() {
        let fake = Arc::new(FakeSpotify::new());
        let args = Args::from_pairs([("busqueda", json!("zzzz")), ("tipo", json!("album"))]);

        let play = PlayTrackTool { api: fake.clone() }.execute(&args).await.unwrap();
        assert_eq!(play, Outcome::empty("No encontré: zzzz"));

        let queue = QueueTrackTool { api: fake.clone() }.execute(&args).await.unwrap();
        assert_eq!(queue, Outcome::empty("No encontrado."));

        let context = PlayContextTool { api: fake.clone() }.execute(&args).await.unwrap();
        assert_eq!(context, Outcome::empty("No encontré ese album."));

        let podcast = PlayPodcastTool { api: fake.clone() }.execute(&args).await.unwrap();
        assert_eq!(podcast, Outcome::empty("No encontré podcasts."));

        assert!(fake.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_volume_is_not_clamped() {
        let fake = Arc::new(FakeSpotify::new());
        let tool = VolumeTool { api: fake.clone() };

        let outcome = tool
            .execute(&Args::from_pairs([("porcentaje", json!(75))]))
            .await
            .unwrap();
        assert_eq!(outcome.to_string(), "Volumen al 75%.");
        assert_eq!(fake.calls(), vec![Call::Volume(75)]);

        tool.execute(&Args::from_pairs([("porcentaje", json!(150))]))
            .await
            .unwrap();
        assert_eq!(fake.calls().last(), Some(&Call::Volume(150)));
    }

    #[tokio::test]
    async fn test_seek_converts_seconds_to_millis() {
        let fake = Arc::new(FakeSpotify::new());
        let outcome = SeekTool { api: fake.clone() }
            .execute(&Args::from_pairs([("segundos", json!(30))]))
            .await
            .unwrap();
        assert_eq!(outcome.to_string(), "Saltando al segundo 30.");
        assert_eq!(fake.calls(), vec![Call::Seek(30_000)]);
    }

    #[tokio::test]
    async fn test_transfer_matches_substring_case_insensitively() {
        let fake = Arc::new(FakeSpotify {
            devices: vec![
                device("d1", "My iPhone", "Smartphone"),
                device("d2", "Living Room PC", "Computer"),
            ],
            ..FakeSpotify::new()
        });
        let tool = TransferPlaybackTool { api: fake.clone() };

        let outcome = tool
            .execute(&Args::from_pairs([("nombre_dispositivo", json!("phone"))]))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::success("Música movida a: My iPhone"));
        assert_eq!(
            fake.mutations(),
            vec![Call::Transfer {
                device_id: "d1".to_string(),
                force_play: true
            }]
        );

        let missing = tool
            .execute(&Args::from_pairs([("nombre_dispositivo", json!("tv"))]))
            .await
            .unwrap();
        assert_eq!(missing, Outcome::empty("No encontré 'tv'."));
    }

    #[tokio::test]
    async fn test_list_devices() {
        let empty = Arc::new(FakeSpotify::new());
        let outcome = ListDevicesTool { api: empty }
            .execute(&Args::default())
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::Empty(_)));

        let fake = Arc::new(FakeSpotify {
            devices: vec![
                device("d1", "My iPhone", "Smartphone"),
                device("d2", "Living Room PC", "Computer"),
            ],
            ..FakeSpotify::new()
        });
        let outcome = ListDevicesTool { api: fake }
            .execute(&Args::default())
            .await
            .unwrap();
        assert_eq!(
            outcome.to_string(),
            "- My iPhone (Smartphone) ID: d1\n- Living Room PC (Computer) ID: d2"
        );
    }

    #[tokio::test]
    async fn test_play_context_artist() {
        let fake = Arc::new(FakeSpotify {
            search_results: SearchResults {
                artists: Some(Page {
                    items: vec![Artist {
                        id: Some("q".into()),
                        uri: "spotify:artist:q".into(),
                        name: "Queen".into(),
                    }],
                }),
                albums: Some(Page {
                    items: vec![Album {
                        id: Some("a".into()),
                        uri: "spotify:album:a".into(),
                        name: "A Night at the Opera".into(),
                        artists: Vec::new(),
                    }],
                }),
                ..Default::default()
            },
            ..FakeSpotify::new()
        });
        let args = Args::from_pairs([("busqueda", json!("queen")), ("tipo", json!("artist"))]);

        let outcome = PlayContextTool { api: fake.clone() }
            .execute(&args)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::success("Reproduciendo artist: Queen"));
        assert_eq!(
            fake.mutations(),
            vec![Call::StartPlayback(PlaybackRequest::Context(
                "spotify:artist:q".to_string()
            ))]
        );
    }

    #[tokio::test]
    async fn test_play_context_rejects_unknown_kind() {
        let fake = Arc::new(FakeSpotify::new());
        let args = Args::from_pairs([("busqueda", json!("x")), ("tipo", json!("playlist"))]);
        let err = PlayContextTool { api: fake.clone() }
            .execute(&args)
            .await
            .unwrap_err();
        assert!(matches!(err, SpotifyError::InvalidArgument(_)));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_playback_mode_sets_shuffle_then_repeat() {
        let fake = Arc::new(FakeSpotify::new());
        let args = Args::from_pairs([("aleatorio", json!(true)), ("repetir", json!("track"))]);
        let outcome = PlaybackModeTool { api: fake.clone() }
            .execute(&args)
            .await
            .unwrap();
        assert_eq!(outcome.to_string(), "Modo: Shuffle=true, Repeat=track");
        assert_eq!(
            fake.calls(),
            vec![Call::Shuffle(true), Call::Repeat("track".to_string())]
        );
    }

    #[tokio::test]
    async fn test_podcast_without_show_name() {
        let fake = Arc::new(FakeSpotify {
            search_results: SearchResults {
                episodes: Some(Page {
                    items: vec![Episode {
                        id: "e1".into(),
                        uri: "spotify:episode:e1".into(),
                        name: "Capítulo 12".into(),
                        show: None,
                    }],
                }),
                ..Default::default()
            },
            ..FakeSpotify::new()
        });
        let outcome = PlayPodcastTool { api: fake }
            .execute(&Args::from_pairs([("busqueda", json!("capitulo"))]))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::success("Podcast: Capítulo 12"));
    }

    #[tokio::test]
    async fn test_now_playing() {
        let mut playback = playback_of(track("t1", "Don't Stop Me Now", "Queen"));
        playback.progress_ms = Some(65_000);
        let fake = Arc::new(FakeSpotify {
            playback: Some(playback),
            ..FakeSpotify::new()
        });
        let outcome = NowPlayingTool { api: fake }
            .execute(&Args::default())
            .await
            .unwrap();
        assert_eq!(
            outcome.to_string(),
            "Sonando: Don't Stop Me Now - Queen (1:05/3:20)"
        );

        let mut paused = playback_of(track("t2", "Love of My Life", "Queen"));
        paused.is_playing = false;
        paused.progress_ms = Some(12_000);
        let fake = Arc::new(FakeSpotify {
            playback: Some(paused),
            ..FakeSpotify::new()
        });
        let outcome = NowPlayingTool { api: fake.clone() }
            .execute(&Args::default())
            .await
            .unwrap();
        assert_eq!(
            outcome.to_string(),
            "En pausa: Love of My Life - Queen (0:12/3:20)"
        );
        assert!(fake.mutations().is_empty());

        let idle = Arc::new(FakeSpotify::new());
        let outcome = NowPlayingTool { api: idle }
            .execute(&Args::default())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::empty(NOTHING_PLAYING));
    }

    #[tokio::test]
    async fn test_simple_transport_controls() {
        let fake = Arc::new(FakeSpotify::new());
        let args = Args::default();
        assert_eq!(
            PauseTool { api: fake.clone() }.execute(&args).await.unwrap().to_string(),
            "Pausado."
        );
        assert_eq!(
            NextTrackTool { api: fake.clone() }.execute(&args).await.unwrap().to_string(),
            "Siguiente pista..."
        );
        ResumeTool { api: fake.clone() }.execute(&args).await.unwrap();
        PreviousTrackTool { api: fake.clone() }.execute(&args).await.unwrap();
        assert_eq!(
            fake.calls(),
            vec![
                Call::Pause,
                Call::Next,
                Call::StartPlayback(PlaybackRequest::Resume),
                Call::Previous
            ]
        );
    }
}
