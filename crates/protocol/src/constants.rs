use std::fmt;

/// OAuth token endpoint used for refresh-token exchanges.
pub const DEFAULT_TOKEN_URL: &str = "https://api.dropboxapi.com/oauth2/token";

/// Base URL of the content (upload) API.
pub const DEFAULT_CONTENT_URL: &str = "https://content.dropboxapi.com/2";

/// Header carrying the JSON-encoded call argument on content endpoints.
pub const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Default chunk size for session uploads: 100 MiB.
///
/// Files at or below this size go up in a single call.
pub const DEFAULT_CHUNK_SIZE: u64 = 100 * 1024 * 1024;

/// Block size used by the provider's content hash (4 MiB).
pub const CONTENT_HASH_BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// A content endpoint, relative to the content base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Upload,
    SessionStart,
    SessionAppend,
    SessionFinish,
}

impl Endpoint {
    /// Path appended to the content base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Upload => "/files/upload",
            Endpoint::SessionStart => "/files/upload_session/start",
            Endpoint::SessionAppend => "/files/upload_session/append_v2",
            Endpoint::SessionFinish => "/files/upload_session/finish",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Upload.path(), "/files/upload");
        assert_eq!(
            Endpoint::SessionAppend.to_string(),
            "/files/upload_session/append_v2"
        );
    }

    #[test]
    fn default_chunk_is_whole_hash_blocks() {
        assert_eq!(DEFAULT_CHUNK_SIZE % CONTENT_HASH_BLOCK_SIZE as u64, 0);
    }
}
