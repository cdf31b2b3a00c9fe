use crate::spotify::auth;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub api_url: String,
    pub accounts_url: String,
    pub market: String,
    pub http_timeout_secs: u64,
}

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        let client_id = non_empty_var("SPOTIPY_CLIENT_ID")
            .ok_or_else(|| anyhow::anyhow!("SPOTIPY_CLIENT_ID must be set"))?;
        let client_secret = non_empty_var("SPOTIPY_CLIENT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SPOTIPY_CLIENT_SECRET must be set"))?;
        let redirect_uri = env::var("SPOTIPY_REDIRECT_URI").unwrap_or_else(|_| {
            tracing::warn!(
                "SPOTIPY_REDIRECT_URI not set, using {}",
                DEFAULT_REDIRECT_URI
            );
            DEFAULT_REDIRECT_URI.to_string()
        });
        let accounts_url =
            env::var("SPOTIFY_ACCOUNTS_URL").unwrap_or_else(|_| DEFAULT_ACCOUNTS_URL.to_string());

        let refresh_token = non_empty_var("SPOTIPY_REFRESH_TOKEN");
        let access_token = non_empty_var("SPOTIPY_ACCESS_TOKEN");
        if refresh_token.is_none() && access_token.is_none() {
            let url = auth::authorize_url(&accounts_url, &client_id, &redirect_uri)?;
            return Err(anyhow::anyhow!(
                "No authorized Spotify session: set SPOTIPY_REFRESH_TOKEN or SPOTIPY_ACCESS_TOKEN. \
                 Authorize this app at {} to obtain one.",
                url
            ));
        }

        Ok(Config {
            client_id,
            client_secret,
            redirect_uri,
            refresh_token,
            access_token,
            api_url: env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            accounts_url,
            market: env::var("SPOTIFY_MARKET").unwrap_or_else(|_| "US".to_string()),
            http_timeout_secs: env::var("SPOTIFY_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .field("accounts_url", &self.accounts_url)
            .field("market", &self.market)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
