use http::StatusCode;
use thiserror::Error;

/// Failures while obtaining an access token from `/oauth/token`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("could not get new token, got http status code different than 200: {0}")]
    Status(StatusCode),
    #[error("token response is not valid json: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("token lifetime of {0} seconds is out of range")]
    Expiry(i64),
    #[error("invalid token endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Failures of a single readings fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("readings request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("could not get data from api, got http status code different than 200: {status}")]
    UpstreamStatus { status: StatusCode },
    #[error("readings response is not valid json: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid readings url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// Label used for the fetch failure metric.
    pub fn reason(&self) -> &'static str {
        match self {
            FetchError::Auth(_) => "auth",
            FetchError::Network(_) => "network",
            FetchError::UpstreamStatus { .. } => "status",
            FetchError::Parse(_) => "parse",
            FetchError::InvalidUrl(_) => "url",
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Auth(AuthError::Status(status)) => Some(*status),
            FetchError::UpstreamStatus { status } => Some(*status),
            _ => None,
        }
    }
}

/// Failures while writing the state file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("state file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("state serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}
