//! Wire types for the storage provider's OAuth token endpoint and the
//! content-upload endpoints (single-shot and upload sessions).

pub mod constants;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use constants::Endpoint;
pub use messages::{
    RefreshTokenRequest, SessionAppendArg, SessionFinishArg, SessionStartArg, SessionStartResult,
    TokenResponse,
};
pub use types::{CommitInfo, FileMetadata, UploadSessionCursor, WriteMode};
