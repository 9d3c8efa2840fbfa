use chrono::{DateTime, Utc};
use http::StatusCode;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::FetchError;
use crate::helpers::time::{fallback_query_time, get_instant, now};
use crate::observability::metrics::{get_metrics, Metrics, ENDPOINT_READINGS};
use crate::sources::oauth2::TokenManager;
use crate::sources::readings::{Reading, ReadingsPage};
use crate::sources::Credentials;
use crate::state::cursor::Links;
use crate::state::store::{PersistedApi, PersistedState};
use crate::state::token::Token;
use crate::utils::constants::ACCESS_TOKEN_PARAM;

/// Reads pages of readings for one customer, resuming from the last known
/// `next` link.
///
/// Token and cursor are only mutated through this type. All operations take
/// `&mut self`, so a client is driven by exactly one caller at a time.
#[derive(Debug)]
pub struct EnergyClient {
    credentials: Credentials,
    client: Client,
    tokens: TokenManager,
    links: Links,
}

impl EnergyClient {
    pub fn new(credentials: Credentials, client: Client) -> Self {
        Self {
            tokens: TokenManager::new(client.clone()),
            credentials,
            client,
            links: Links::default(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn token(&self) -> &Token {
        self.tokens.token()
    }

    pub fn cursor(&self) -> &Links {
        &self.links
    }

    /// Take over token and cursor from a persisted state. State saved for
    /// another account is ignored.
    pub fn restore(&mut self, state: PersistedState) -> bool {
        if state.username != self.credentials.username || state.customer != self.credentials.customer {
            warn!(
                "ignoring persisted state of '{}'/'{}', configured '{}'/'{}'",
                state.username, state.customer, self.credentials.username, self.credentials.customer
            );
            return false;
        }
        self.tokens.restore(state.token);
        self.links = state.api.links;
        info!("resuming with persisted token and cursor (next link known: {})", !self.links.is_empty());
        true
    }

    /// Mirror the held token expiry and cursor into the state gauges.
    pub fn publish_gauges(&self, metrics: &Metrics) {
        let token = self.tokens.token();
        let expiry = if token.access_token.is_empty() { 0 } else { token.expires_date.timestamp() };
        metrics.token_expiry_unix.set(expiry);
        metrics.cursor_present.set(i64::from(!self.links.is_empty()));
    }

    /// Snapshot of everything worth persisting. Never includes the password.
    pub fn state(&self) -> PersistedState {
        PersistedState {
            username: self.credentials.username.clone(),
            customer: self.credentials.customer.clone(),
            token: self.tokens.token().clone(),
            api: PersistedApi { links: self.links.clone() },
        }
    }

    /// Page to read next, without the access token: the stored next link, or
    /// the first page starting one hour before `at`.
    pub fn readings_url(&self, at: DateTime<Utc>) -> Result<Url, url::ParseError> {
        match self.links.next_href() {
            Some(next) => Url::parse(next),
            None => self.credentials.readings_url(&fallback_query_time(at)),
        }
    }

    /// Fetch the next page of readings.
    ///
    /// Any non-200 answer clears token and cursor so the next call starts
    /// over with a fresh token and the fallback start time.
    pub async fn fetch_readings(&mut self) -> Result<Vec<Reading>, FetchError> {
        let access_token = self
            .tokens
            .ensure_valid_token(&self.credentials)
            .await?
            .access_token
            .clone();

        let mut url = match self.readings_url(now()) {
            Ok(url) => url,
            Err(err) => {
                // an unparsable next link would fail every tick
                warn!("dropping unusable next link: {}", err);
                self.links.clear();
                return Err(err.into());
            }
        };
        with_access_token(&mut url, &access_token);

        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.fetch_requests.with_label_values(&[ENDPOINT_READINGS]).inc();
        debug!("fetching readings from '{}'", url.path());

        let result = self.request_page(url).await;
        metrics.fetch_duration.with_label_values(&[ENDPOINT_READINGS]).observe(start.elapsed().as_secs_f64());

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                if let FetchError::UpstreamStatus { .. } = err {
                    self.reset();
                    metrics.token_expiry_unix.set(0);
                    metrics.cursor_present.set(0);
                }
                metrics.fetch_failures.with_label_values(&[ENDPOINT_READINGS, err.reason()]).inc();
                return Err(err);
            }
        };

        let (readings, links) = page.into_parts();
        self.links = links;
        metrics.readings_fetched.inc_by(readings.len() as u64);
        metrics.cursor_present.set(i64::from(!self.links.is_empty()));
        info!("fetched {} readings, next link known: {}", readings.len(), !self.links.is_empty());

        Ok(readings)
    }

    async fn request_page(&self, url: Url) -> Result<ReadingsPage, FetchError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UpstreamStatus { status });
        }

        let body = response.bytes().await.map_err(FetchError::Network)?;
        serde_json::from_slice(&body).map_err(FetchError::Parse)
    }

    // TODO: only a 401 proves the token stale; decide whether 5xx should keep the cursor.
    fn reset(&mut self) {
        warn!("upstream rejected the request, dropping token and cursor");
        self.tokens.invalidate();
        self.links.clear();
    }
}

/// Sets `access_token` on the url, replacing one a next link may carry.
/// Other query pairs keep their original encoding unless a replacement is needed.
fn with_access_token(url: &mut Url, access_token: &str) {
    if url.query_pairs().any(|(key, _)| key == ACCESS_TOKEN_PARAM) {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| *key != ACCESS_TOKEN_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    url.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, access_token);
}
