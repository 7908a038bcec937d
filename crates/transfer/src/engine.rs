use std::path::PathBuf;
use std::sync::Arc;

use stemrelay_auth::AccessToken;
use stemrelay_protocol::{CommitInfo, FileMetadata};
use tracing::{debug, info, warn};

use crate::api::UploadApi;
use crate::checksum::{ContentHasher, content_hash};
use crate::chunked::ChunkReader;
use crate::session::UploadSession;
use crate::{DEFAULT_CHUNK_SIZE, TransferError};

/// One file to move to the remote account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source_path: PathBuf,
    /// Absolute remote path, e.g. `/Stem Uploads/20240131_a_b.tar.gz`.
    pub destination_path: String,
    pub size_bytes: u64,
}

/// How a payload of a given size is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    SingleShot,
    /// Start, `chunks - 1` appends, finish.
    Session { chunks: u64 },
}

impl Strategy {
    pub fn for_size(size_bytes: u64, chunk_size: u64) -> Self {
        if size_bytes <= chunk_size {
            Strategy::SingleShot
        } else {
            Strategy::Session {
                chunks: size_bytes.div_ceil(chunk_size),
            }
        }
    }
}

/// Uploads files through an [`UploadApi`], picking single-shot or session
/// transfer by size.
pub struct TransferEngine {
    api: Arc<dyn UploadApi>,
    chunk_size: u64,
}

impl TransferEngine {
    /// A `chunk_size` of 0 selects [`DEFAULT_CHUNK_SIZE`].
    pub fn new(api: Arc<dyn UploadApi>, chunk_size: u64) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Self { api, chunk_size }
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn strategy(&self, size_bytes: u64) -> Strategy {
        Strategy::for_size(size_bytes, self.chunk_size)
    }

    /// Transfers `request.source_path` to `request.destination_path`.
    ///
    /// The token authorizes every call of the sequence and is not checked
    /// again while the transfer runs.
    pub async fn upload(
        &self,
        request: TransferRequest,
        token: &AccessToken,
    ) -> Result<FileMetadata, TransferError> {
        let commit = CommitInfo::add(request.destination_path.clone());
        let strategy = self.strategy(request.size_bytes);
        info!(
            path = %request.destination_path,
            size = request.size_bytes,
            ?strategy,
            "starting transfer"
        );

        let meta = match strategy {
            Strategy::SingleShot => self.upload_single(&request, &commit, token).await?,
            Strategy::Session { chunks } => {
                self.upload_session(&request, &commit, chunks, token)
                    .await?
            }
        };

        info!(
            path = %meta.path_display,
            size = meta.size,
            "transfer committed"
        );
        Ok(meta)
    }

    async fn upload_single(
        &self,
        request: &TransferRequest,
        commit: &CommitInfo,
        token: &AccessToken,
    ) -> Result<FileMetadata, TransferError> {
        let data = tokio::fs::read(&request.source_path).await?;
        let actual = data.len() as u64;
        if actual != request.size_bytes {
            return Err(TransferError::SizeMismatch {
                expected: request.size_bytes,
                actual,
            });
        }

        let local_hash = content_hash(&data);
        let meta = self.api.upload(token, commit, data).await?;
        verify_hash(&local_hash, &meta)?;
        Ok(meta)
    }

    async fn upload_session(
        &self,
        request: &TransferRequest,
        commit: &CommitInfo,
        chunks: u64,
        token: &AccessToken,
    ) -> Result<FileMetadata, TransferError> {
        let mut reader = ChunkReader::open(&request.source_path, self.chunk_size as usize).await?;
        if reader.file_size() != request.size_bytes {
            return Err(TransferError::SizeMismatch {
                expected: request.size_bytes,
                actual: reader.file_size(),
            });
        }

        let mut session = UploadSession::new();
        let mut hasher = ContentHasher::new();
        let result = self
            .drive_session(
                &mut reader,
                &mut session,
                &mut hasher,
                request.size_bytes,
                commit,
                token,
            )
            .await;

        match result {
            Ok(meta) => {
                debug!(chunks, appends = session.append_count(), "session finished");
                verify_hash(&hasher.finish(), &meta)?;
                Ok(meta)
            }
            Err(e) => {
                if let Some(orphan) = session.fail() {
                    warn!(
                        session_id = %orphan.session_id,
                        offset = orphan.offset,
                        error = %e,
                        "upload session left open on remote"
                    );
                }
                Err(e)
            }
        }
    }

    async fn drive_session(
        &self,
        reader: &mut ChunkReader,
        session: &mut UploadSession,
        hasher: &mut ContentHasher,
        size_bytes: u64,
        commit: &CommitInfo,
        token: &AccessToken,
    ) -> Result<FileMetadata, TransferError> {
        let first = reader
            .next_chunk()
            .await?
            .ok_or(TransferError::SizeMismatch {
                expected: size_bytes,
                actual: 0,
            })?;
        let len = first.len();
        hasher.update(&first.data);
        let session_id = self.api.start_session(token, first.data).await?;
        session.start(session_id, len)?;
        debug!(offset = session.offset(), "session started");

        while let Some(chunk) = reader.next_chunk().await? {
            session.check_offset(chunk.offset)?;
            let cursor = session.cursor()?;
            let len = chunk.len();
            hasher.update(&chunk.data);
            self.api.append(token, &cursor, chunk.data).await?;
            let offset = session.append(len)?;
            debug!(offset, total = size_bytes, "chunk appended");
        }

        if session.offset() != size_bytes {
            return Err(TransferError::SizeMismatch {
                expected: size_bytes,
                actual: session.offset(),
            });
        }

        let cursor = session.cursor()?;
        let meta = self.api.finish(token, &cursor, commit).await?;
        session.finish()?;
        Ok(meta)
    }
}

fn verify_hash(local: &str, meta: &FileMetadata) -> Result<(), TransferError> {
    match &meta.content_hash {
        Some(remote) if remote != local => Err(TransferError::ChecksumMismatch {
            local: local.to_string(),
            remote: remote.clone(),
        }),
        _ => Ok(()),
    }
}
