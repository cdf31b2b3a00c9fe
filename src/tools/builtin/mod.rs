//! The Spotify operations published to the assistant.

pub mod discovery;
pub mod insights;
pub mod library;
pub mod playback;

use crate::error::Result;
use crate::spotify::{SpotifyApi, Track};
use crate::tools::ToolRegistry;
use std::sync::Arc;

pub(crate) const NOTHING_PLAYING: &str = "Nada sonando.";

/// Registers every operation, each capturing the same client handle.
pub fn register_all(registry: &mut ToolRegistry, api: Arc<dyn SpotifyApi>) {
    registry.register(Arc::new(playback::ListDevicesTool { api: api.clone() }));
    registry.register(Arc::new(playback::PlayTrackTool { api: api.clone() }));
    registry.register(Arc::new(playback::PauseTool { api: api.clone() }));
    registry.register(Arc::new(playback::ResumeTool { api: api.clone() }));
    registry.register(Arc::new(playback::NextTrackTool { api: api.clone() }));
    registry.register(Arc::new(playback::PreviousTrackTool { api: api.clone() }));
    registry.register(Arc::new(playback::VolumeTool { api: api.clone() }));
    registry.register(Arc::new(playback::SeekTool { api: api.clone() }));
    registry.register(Arc::new(playback::TransferPlaybackTool { api: api.clone() }));
    registry.register(Arc::new(playback::QueueTrackTool { api: api.clone() }));
    registry.register(Arc::new(playback::PlayContextTool { api: api.clone() }));
    registry.register(Arc::new(playback::PlaybackModeTool { api: api.clone() }));
    registry.register(Arc::new(playback::PlayPodcastTool { api: api.clone() }));
    registry.register(Arc::new(playback::NowPlayingTool { api: api.clone() }));

    registry.register(Arc::new(library::SaveCurrentTrackTool { api: api.clone() }));
    registry.register(Arc::new(library::PlaylistFromCurrentTool { api: api.clone() }));
    registry.register(Arc::new(library::AddToPlaylistTool { api: api.clone() }));

    registry.register(Arc::new(insights::TopTracksTool { api: api.clone() }));
    registry.register(Arc::new(insights::TrackAnalysisTool { api: api.clone() }));
    registry.register(Arc::new(insights::ArtistInfoTool { api: api.clone() }));

    registry.register(Arc::new(discovery::SimilarArtistsRadioTool { api: api.clone() }));
    registry.register(Arc::new(discovery::RecommendByParamsTool { api }));
}

/// The track loaded on the active device, if any.
pub(crate) async fn current_track(api: &dyn SpotifyApi) -> Result<Option<Track>> {
    Ok(api.current_playback().await?.and_then(|p| p.item))
}

/// First item whose name contains `query`, ignoring case.
pub(crate) fn find_by_name<'a, T>(
    items: &'a [T],
    query: &str,
    name: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let needle = query.to_lowercase();
    items
        .iter()
        .find(|item| name(item).to_lowercase().contains(&needle))
}

/// `m:ss`
pub(crate) fn format_clock(ms: u64) -> String {
    let total = ms / 1000;
    format!("{}:{:02}", total / 60, total % 60)
}

/// `1234567` → `1,234,567`
pub(crate) fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::fake::FakeSpotify;

    #[test]
    fn test_find_by_name_first_match_wins() {
        let names = vec!["My iPhone", "Living Room PC", "Old phone"];
        assert_eq!(find_by_name(&names, "phone", |n| *n), Some(&"My iPhone"));
        assert_eq!(find_by_name(&names, "ROOM", |n| *n), Some(&"Living Room PC"));
        assert_eq!(find_by_name(&names, "tv", |n| *n), None);
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(354_320), "5:54");
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(52_341_678), "52,341,678");
    }

    #[test]
    fn test_register_all_names() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry, Arc::new(FakeSpotify::new()));
        assert_eq!(registry.len(), 22);

        for name in [
            "listar_dispositivos",
            "reproducir_musica",
            "pausar_musica",
            "siguiente_cancion",
            "cambiar_volumen",
            "saltar_a_segundo",
            "transferir_musica_a_dispositivo",
            "agregar_a_fila",
            "reproducir_contexto",
            "cambiar_modo_reproduccion",
            "guardar_en_favoritos",
            "crear_playlist_basada_en_actual",
            "agregar_a_playlist_existente",
            "mis_top_canciones",
            "obtener_analisis_cancion",
            "obtener_info_artista",
            "radio_artistas_similares",
            "reproducir_podcast",
            "recomendar_por_parametros",
            "reanudar_musica",
            "cancion_anterior",
            "que_suena",
        ] {
            assert!(registry.get(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn test_definitions_describe_parameters() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry, Arc::new(FakeSpotify::new()));

        let definitions = registry.get_definitions();
        let context = definitions
            .iter()
            .find(|d| d["function"]["name"] == "reproducir_contexto")
            .unwrap();
        let parameters = &context["function"]["parameters"];
        assert_eq!(parameters["required"], serde_json::json!(["busqueda"]));
        assert_eq!(parameters["properties"]["tipo"]["default"], "album");

        let recommend = definitions
            .iter()
            .find(|d| d["function"]["name"] == "recomendar_por_parametros")
            .unwrap();
        assert_eq!(
            recommend["function"]["parameters"]["properties"]["energia"]["type"],
            "number"
        );
    }
}
