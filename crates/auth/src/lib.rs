//! OAuth access-token lifecycle for the storage provider.
//!
//! [`TokenManager`] owns the single cached [`AccessToken`] and hands it out
//! while it is still valid. When the token is missing or expired it asks its
//! [`TokenRefresher`] for a new one; [`OAuthRefresher`] implements that
//! exchange against the provider's token endpoint with a long-lived refresh
//! credential.

mod manager;
mod refresher;
mod token;

pub use manager::TokenManager;
pub use refresher::{OAuthCredentials, OAuthRefresher, RefreshFuture, TokenRefresher};
pub use token::AccessToken;

/// Errors produced while obtaining an access token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token response did not contain an access token")]
    MissingToken,

    #[error("token lifetime must be positive, got {0}s")]
    InvalidLifetime(i64),
}
