//! Single-entry access-token cache.

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::AuthError;
use crate::refresher::TokenRefresher;
use crate::token::AccessToken;

/// Owns the cached access token and refreshes it on demand.
///
/// Share it behind an `Arc`; it is the only thing allowed to replace the
/// cached token. Concurrent callers that find the token expired queue on the
/// write lock, so a burst of requests triggers a single refresh.
pub struct TokenManager {
    refresher: Box<dyn TokenRefresher>,
    cached: RwLock<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(refresher: impl TokenRefresher + 'static) -> Self {
        Self {
            refresher: Box::new(refresher),
            cached: RwLock::new(None),
        }
    }

    /// Returns the cached token while it is valid, refreshing it otherwise.
    ///
    /// On refresh failure the previously cached token (possibly expired) is
    /// left in place and the next call tries again.
    pub async fn get_valid_token(&self) -> Result<AccessToken, AuthError> {
        {
            let guard = self.cached.read().await;
            if let Some(token) = guard.as_ref()
                && token.is_valid()
            {
                debug!(remaining_secs = token.remaining_secs(), "using cached token");
                return Ok(token.clone());
            }
        }

        let mut guard = self.cached.write().await;

        // Another caller may have refreshed while we waited for the lock.
        if let Some(token) = guard.as_ref()
            && token.is_valid()
        {
            return Ok(token.clone());
        }

        match self.refresher.refresh().await {
            Ok(token) if token.is_valid() => {
                info!(
                    expires_in_secs = token.remaining_secs(),
                    "access token refreshed"
                );
                *guard = Some(token.clone());
                Ok(token)
            }
            Ok(token) => {
                let lifetime = (token.expires_at() - chrono::Utc::now()).num_seconds();
                warn!(lifetime, "refresh returned an already expired token");
                Err(AuthError::InvalidLifetime(lifetime))
            }
            Err(e) => {
                warn!(error = %e, stale_token_kept = guard.is_some(), "access token refresh failed");
                Err(e)
            }
        }
    }

    /// Current cached token without triggering a refresh.
    pub async fn cached(&self) -> Option<AccessToken> {
        self.cached.read().await.clone()
    }
}
