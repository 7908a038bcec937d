//! Chunked upload engine for the storage provider.
//!
//! Payloads at or below the chunk size go up in one call. Larger payloads
//! use an upload session: the first chunk opens it, every further chunk is
//! appended at the acknowledged offset, and a final call commits the file.

mod api;
mod checksum;
mod chunked;
mod client;
mod engine;
mod session;

pub use api::{ApiFuture, UploadApi};
pub use checksum::{ContentHasher, content_hash};
pub use chunked::{Chunk, ChunkReader};
pub use client::ContentClient;
pub use engine::{Strategy, TransferEngine, TransferRequest};
pub use session::{SessionState, UploadSession};
pub use stemrelay_protocol::constants::DEFAULT_CHUNK_SIZE;
pub use stemrelay_protocol::{Endpoint, FileMetadata};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("offset mismatch: session at {expected}, chunk at {actual}")]
    OffsetMismatch { expected: u64, actual: u64 },

    #[error("size mismatch: expected {expected} bytes, read {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("content hash mismatch: local {local}, remote {remote}")]
    ChecksumMismatch { local: String, remote: String },

    #[error("invalid session state: {0}")]
    InvalidState(String),

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}
