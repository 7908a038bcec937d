//! Refresh-token exchange against the provider's OAuth endpoint.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::Utc;
use stemrelay_protocol::constants::DEFAULT_TOKEN_URL;
use stemrelay_protocol::{RefreshTokenRequest, TokenResponse};
use tracing::debug;

use crate::AuthError;
use crate::token::AccessToken;

/// Future returned by [`TokenRefresher::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Result<AccessToken, AuthError>> + Send + 'a>>;

/// Source of fresh access tokens.
///
/// [`TokenManager`](crate::TokenManager) calls this only when its cached
/// token is missing or expired. Keeping the exchange behind a trait lets the
/// cache policy be exercised without a network.
pub trait TokenRefresher: Send + Sync {
    fn refresh(&self) -> RefreshFuture<'_>;
}

/// Application credentials plus the long-lived refresh credential.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

/// Exchanges a refresh token for a short-lived access token over HTTP.
pub struct OAuthRefresher {
    http: reqwest::Client,
    token_url: String,
    credentials: OAuthCredentials,
}

impl OAuthRefresher {
    /// Creates a refresher that posts to the default token endpoint.
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            credentials,
        })
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    async fn exchange(&self) -> Result<AccessToken, AuthError> {
        let form = RefreshTokenRequest::new(
            &self.credentials.refresh_token,
            &self.credentials.client_id,
            &self.credentials.client_secret,
        );

        debug!(url = %self.token_url, "requesting access token");
        let resp = self.http.post(&self.token_url).form(&form).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        let parsed: TokenResponse = serde_json::from_slice(&body)?;
        token_from_response(parsed)
    }
}

impl TokenRefresher for OAuthRefresher {
    fn refresh(&self) -> RefreshFuture<'_> {
        Box::pin(self.exchange())
    }
}

/// Validates a token response and stamps its expiry relative to now.
fn token_from_response(resp: TokenResponse) -> Result<AccessToken, AuthError> {
    let token = resp
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;
    let lifetime = resp.expires_in.unwrap_or(0);
    if lifetime <= 0 {
        return Err(AuthError::InvalidLifetime(lifetime));
    }
    AccessToken::try_with_lifetime(token, lifetime, Utc::now())
        .ok_or(AuthError::InvalidLifetime(lifetime))
}
