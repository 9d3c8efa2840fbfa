//! Upstream readings api: OAuth2 password grant and paginated reads.

use std::fmt;

use url::Url;

use crate::config::service::EnergyConfig;
use crate::utils::constants::TOKEN_PATH;

pub mod energy_client;
pub mod http;
pub mod oauth2;
pub mod readings;

/// Account the client reads for. Fixed for the lifetime of a client.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub customer: String,
    pub client_id: String,
    api_base: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        customer: impl Into<String>,
        api_base: &str,
        client_id: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        // fail early on a broken base url instead of on the first tick
        Url::parse(api_base)?;
        Ok(Self {
            username: username.into(),
            password: password.into(),
            customer: customer.into(),
            client_id: client_id.into(),
            api_base: api_base.trim_end_matches('/').to_owned(),
        })
    }

    pub fn from_config(cfg: &EnergyConfig) -> Result<Self, url::ParseError> {
        Self::new(&cfg.username, &cfg.password, &cfg.customer, &cfg.api, &cfg.client_id)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn token_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}{}", self.api_base, TOKEN_PATH))
    }

    /// First page of readings starting at `query_time`.
    pub fn readings_url(&self, query_time: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}/users/{}/readings/{}", self.api_base, self.customer, query_time))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("customer", &self.customer)
            .field("client_id", &self.client_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}
