use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Failures raised while talking to the Spotify Web API.
///
/// Handlers never surface these directly: the executor turns them into
/// `Outcome::Failure` and the rendered text carries the `Display` form.
#[derive(Error, Debug)]
pub enum SpotifyError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limit exceeded, try again later")]
    RateLimited,

    #[error("Spotify API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON from Spotify: {0}")]
    Json(#[from] serde_json::Error),

    /// A response parsed but lacked something the operation needs.
    #[error("missing field in response: {0}")]
    MissingField(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("authentication error: {0}")]
    Auth(String),
}

impl SpotifyError {
    pub fn from_status_code(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            429 => Self::RateLimited,
            _ => Self::Api {
                status,
                message: message.into(),
            },
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Auth(_))
    }
}
