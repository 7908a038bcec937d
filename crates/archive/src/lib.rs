//! Archive production for relayed uploads.
//!
//! An [`ArchiveProducer`] turns N staged input files plus a [`Manifest`]
//! into a single archive file of known length. [`TarGzProducer`] is the
//! default gzip-compressed tar implementation.

mod entry;
mod manifest;
mod producer;

pub use entry::{EntryNames, entry_name, validate_entry_name};
pub use manifest::{MANIFEST_ENTRY_NAME, Manifest, ManifestFile, PLACEHOLDER};
pub use producer::{ArchiveFuture, ArchiveInput, ArchiveProducer, ProducedArchive, TarGzProducer};

/// Errors produced while building an archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid entry name: {0}")]
    InvalidEntryName(String),

    #[error("archive task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
