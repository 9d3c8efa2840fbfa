use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::helpers::time::now;

pub const TOKEN_VALUE_STUB: &'static str = "";

/// OAuth2 access token as held by the client and persisted in the state file.
///
/// `expires_date` is computed locally when the token is issued; it is the
/// only expiry the client trusts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_date: DateTime<Utc>,
    pub scope: String,
    pub jti: String,
}

impl Default for Token {
    fn default() -> Self {
        Self {
            access_token: TOKEN_VALUE_STUB.to_owned(),
            token_type: String::new(),
            expires_in: 0,
            expires_date: DateTime::<Utc>::default(),
            scope: String::new(),
            jti: String::new(),
        }
    }
}

/// Body of a successful `/oauth/token` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub jti: String,
}

impl Token {
    /// Token issued at `issued_at`. An `expires_in` that does not fit a date
    /// is rejected rather than trusted.
    pub fn issued(response: TokenResponse, issued_at: DateTime<Utc>) -> Result<Self, AuthError> {
        let expires_date = Duration::try_seconds(response.expires_in)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or(AuthError::Expiry(response.expires_in))?;

        Ok(Self {
            expires_date,
            access_token: response.access_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            scope: response.scope,
            jti: response.jti,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now())
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        !self.access_token.is_empty() && at < self.expires_date
    }

    pub fn clear(&mut self) {
        *self = Token::default();
    }
}
