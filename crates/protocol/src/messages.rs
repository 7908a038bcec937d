use serde::{Deserialize, Serialize};

use crate::types::{CommitInfo, UploadSessionCursor};

// ---------------------------------------------------------------------------
// OAuth
// ---------------------------------------------------------------------------

/// Form body of a refresh-token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshTokenRequest {
    pub grant_type: &'static str,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
}

impl RefreshTokenRequest {
    pub fn new(refresh_token: &str, client_id: &str, client_secret: &str) -> Self {
        Self {
            grant_type: "refresh_token",
            refresh_token: refresh_token.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }
}

/// Response of the token endpoint.
///
/// Fields are optional so that a well-formed body without a token can be
/// told apart from garbage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Upload sessions
// ---------------------------------------------------------------------------

/// Argument of the session start call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStartArg {
    pub close: bool,
}

/// Result of the session start call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionStartResult {
    pub session_id: String,
}

/// Argument of the session append call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionAppendArg {
    pub cursor: UploadSessionCursor,
    pub close: bool,
}

/// Argument of the session finish call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionFinishArg {
    pub cursor: UploadSessionCursor,
    pub commit: CommitInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_request_form_fields() {
        let req = RefreshTokenRequest::new("rt", "key", "secret");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["grant_type"], "refresh_token");
        assert_eq!(json["refresh_token"], "rt");
        assert_eq!(json["client_id"], "key");
        assert_eq!(json["client_secret"], "secret");
    }

    #[test]
    fn token_response_without_token() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"error":"invalid_grant"}"#).unwrap();
        assert!(resp.access_token.is_none());
        assert!(resp.expires_in.is_none());
    }

    #[test]
    fn finish_arg_shape() {
        let arg = SessionFinishArg {
            cursor: UploadSessionCursor {
                session_id: "sess-1".into(),
                offset: 250,
            },
            commit: CommitInfo::add("/Uploads/x.tar.gz"),
        };
        let json = serde_json::to_value(&arg).unwrap();
        assert_eq!(json["cursor"]["session_id"], "sess-1");
        assert_eq!(json["cursor"]["offset"], 250);
        assert_eq!(json["commit"]["mode"], "add");
        assert_eq!(json["commit"]["autorename"], true);
        assert_eq!(json["commit"]["mute"], false);
    }

    #[test]
    fn append_arg_shape() {
        let arg = SessionAppendArg {
            cursor: UploadSessionCursor {
                session_id: "sess-1".into(),
                offset: 100,
            },
            close: false,
        };
        let json = serde_json::to_string(&arg).unwrap();
        assert_eq!(
            json,
            r#"{"cursor":{"session_id":"sess-1","offset":100},"close":false}"#
        );
    }
}
