use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// A bearer token and the instant it stops being valid.
///
/// Replaced wholesale on refresh; never mutated in place.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Builds a token that expires `lifetime_secs` after `issued_at`.
    ///
    /// Returns `None` when the expiry falls outside the representable range.
    pub fn try_with_lifetime(
        token: impl Into<String>,
        lifetime_secs: i64,
        issued_at: DateTime<Utc>,
    ) -> Option<Self> {
        let expires_at = Duration::try_seconds(lifetime_secs)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))?;
        Some(Self::new(token, expires_at))
    }

    /// Like [`try_with_lifetime`](Self::try_with_lifetime), saturating at
    /// the earliest or latest representable instant.
    pub fn with_lifetime(
        token: impl Into<String>,
        lifetime_secs: i64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let token = token.into();
        match Self::try_with_lifetime(token.clone(), lifetime_secs, issued_at) {
            Some(t) => t,
            None if lifetime_secs < 0 => Self::new(token, DateTime::<Utc>::MIN_UTC),
            None => Self::new(token, DateTime::<Utc>::MAX_UTC),
        }
    }

    /// The raw token value.
    pub fn secret(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// True while `now` is strictly before the expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Whole seconds left before expiry (0 once expired).
    pub fn remaining_secs(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_is_strict() {
        let now = Utc::now();
        let token = AccessToken::new("t", now);
        assert!(!token.is_valid_at(now));
        assert!(token.is_valid_at(now - Duration::seconds(1)));
    }

    #[test]
    fn lifetime_sets_expiry() {
        let now = Utc::now();
        let token = AccessToken::with_lifetime("t", 14_400, now);
        assert_eq!(token.expires_at(), now + Duration::seconds(14_400));
        assert!(token.is_valid_at(now));
    }

    #[test]
    fn bearer_header_value() {
        let token = AccessToken::with_lifetime("abc", 60, Utc::now());
        assert_eq!(token.bearer(), "Bearer abc");
    }

    #[test]
    fn debug_redacts_secret() {
        let token = AccessToken::with_lifetime("super-secret", 60, Utc::now());
        let printed = format!("{token:?}");
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn out_of_range_lifetime() {
        let now = Utc::now();
        assert!(AccessToken::try_with_lifetime("t", i64::MAX, now).is_none());
        assert!(AccessToken::try_with_lifetime("t", i64::MIN, now).is_none());

        let saturated = AccessToken::with_lifetime("t", i64::MAX, now);
        assert_eq!(saturated.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert!(saturated.is_valid_at(now));
        assert!(!AccessToken::with_lifetime("t", i64::MIN, now).is_valid_at(now));
    }

    #[test]
    fn remaining_never_negative() {
        let token = AccessToken::with_lifetime("t", -30, Utc::now());
        assert_eq!(token.remaining_secs(), 0);
        assert!(!token.is_valid());
    }
}
