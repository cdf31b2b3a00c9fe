//! Bearer tokens for the Web API.
//!
//! The interactive authorization-code flow happens outside this process.
//! The session starts either from a refresh token, which it exchanges at the
//! accounts service and caches in memory, or from a fixed access token.

use crate::config::Config;
use crate::error::{Result, SpotifyError};
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Permission scopes every operation together needs.
pub const SCOPES: &[&str] = &[
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-library-modify",
    "user-top-read",
    "playlist-modify-public",
    "playlist-modify-private",
    "playlist-read-private",
    "playlist-read-collaborative",
];

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

pub fn authorize_url(accounts_url: &str, client_id: &str, redirect_uri: &str) -> Result<String> {
    let base = format!("{}/authorize", accounts_url.trim_end_matches('/'));
    let scope = SCOPES.join(" ");
    let url = Url::parse_with_params(
        &base,
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("scope", scope.as_str()),
        ],
    )
    .map_err(|e| SpotifyError::InvalidArgument(format!("bad accounts URL: {}", e)))?;
    Ok(url.to_string())
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    /// `None` for tokens handed to us without a lifetime.
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => at - Duration::seconds(EXPIRY_MARGIN_SECS) > now,
            None => true,
        }
    }
}

struct TokenState {
    refresh_token: Option<String>,
    access: Option<AccessToken>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

pub struct SpotifySession {
    client_id: String,
    client_secret: String,
    token_url: String,
    state: Mutex<TokenState>,
}

impl SpotifySession {
    pub fn from_config(config: &Config) -> Self {
        let access = match (&config.refresh_token, &config.access_token) {
            (Some(_), Some(_)) => {
                debug!("Refresh token configured, ignoring SPOTIPY_ACCESS_TOKEN");
                None
            }
            (None, Some(token)) => Some(AccessToken {
                value: token.clone(),
                expires_at: None,
            }),
            _ => None,
        };

        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_url: format!("{}/api/token", config.accounts_url.trim_end_matches('/')),
            state: Mutex::new(TokenState {
                refresh_token: config.refresh_token.clone(),
                access,
            }),
        }
    }

    /// Returns a usable bearer token, refreshing it first if needed.
    pub async fn access_token(&self, http: &Client) -> Result<String> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.access.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let Some(refresh_token) = state.refresh_token.clone() else {
            return Err(SpotifyError::Auth(
                "access token expired and no refresh token is configured".to_string(),
            ));
        };

        let response = self.refresh(http, &refresh_token).await?;
        let value = response.access_token.clone();
        state.access = Some(AccessToken {
            value: response.access_token,
            expires_at: Some(Utc::now() + Duration::seconds(response.expires_in)),
        });
        if let Some(rotated) = response.refresh_token {
            debug!("Spotify rotated the refresh token");
            state.refresh_token = Some(rotated);
        }
        Ok(value)
    }

    /// Drops the cached access token so the next call refreshes it.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.refresh_token.is_some() {
            state.access = None;
        }
    }

    async fn refresh(&self, http: &Client, refresh_token: &str) -> Result<TokenResponse> {
        info!("Refreshing Spotify access token");
        let response = http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&text)
                .map(|e| match e.error_description {
                    Some(desc) => format!("{}: {}", e.error, desc),
                    None => e.error,
                })
                .unwrap_or(text);
            warn!("Token refresh failed ({}): {}", status, message);
            return Err(SpotifyError::Auth(message));
        }

        Ok(serde_json::from_str(&text)?)
    }
}
