use http::StatusCode;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::helpers::time::{get_instant, now};
use crate::observability::metrics::{get_metrics, ENDPOINT_TOKEN};
use crate::sources::Credentials;
use crate::state::token::{Token, TokenResponse};
use crate::utils::constants::GRANT_TYPE_PASSWORD;

const APPLICATION_JSON: &str = "application/json";

/// Holds the current access token and fetches a new one when it is
/// missing or expired.
#[derive(Debug, Clone)]
pub struct TokenManager {
    client: Client,
    token: Token,
}

impl TokenManager {
    pub fn new(client: Client) -> Self {
        Self { client, token: Token::default() }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn restore(&mut self, token: Token) {
        self.token = token;
    }

    pub fn invalidate(&mut self) {
        self.token.clear();
    }

    /// Returns the held token if still valid, otherwise performs a password
    /// grant. No retry here, the next poll tick is the retry.
    pub async fn ensure_valid_token(&mut self, credentials: &Credentials) -> Result<&Token, AuthError> {
        if self.token.is_valid() {
            debug!("token still valid until {}", self.token.expires_date);
            return Ok(&self.token);
        }

        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.fetch_requests.with_label_values(&[ENDPOINT_TOKEN]).inc();

        let result = self.request_token(credentials).await;
        metrics.fetch_duration.with_label_values(&[ENDPOINT_TOKEN]).observe(start.elapsed().as_secs_f64());

        match result {
            Ok(token) => {
                info!("new token for '{}' valid until {}", credentials.username, token.expires_date);
                metrics.token_refreshes.inc();
                metrics.token_expiry_unix.set(token.expires_date.timestamp());
                self.token = token;
                Ok(&self.token)
            }
            Err(err) => {
                warn!("token request for '{}' failed: {}", credentials.username, err);
                metrics.fetch_failures.with_label_values(&[ENDPOINT_TOKEN, auth_reason(&err)]).inc();
                Err(err)
            }
        }
    }

    async fn request_token(&self, credentials: &Credentials) -> Result<Token, AuthError> {
        let url = credentials.token_url()?;
        let form = [
            ("grant_type", GRANT_TYPE_PASSWORD),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let response = self
            .client
            .post(url)
            .header(ACCEPT, APPLICATION_JSON)
            .basic_auth(&credentials.client_id, Some(""))
            .form(&form)
            .send()
            .await
            .map_err(AuthError::Network)?;

        let status = response.status();
        let body = response.bytes().await.map_err(AuthError::Network)?;
        if status != StatusCode::OK {
            debug!("token endpoint answered {}: {}", status, String::from_utf8_lossy(&body));
            return Err(AuthError::Status(status));
        }

        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(AuthError::Parse)?;
        Token::issued(parsed, now())
    }
}

fn auth_reason(err: &AuthError) -> &'static str {
    match err {
        AuthError::Network(_) => "network",
        AuthError::Status(_) => "status",
        AuthError::Parse(_) | AuthError::Expiry(_) => "parse",
        AuthError::InvalidUrl(_) => "url",
    }
}
