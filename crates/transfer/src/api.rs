use std::future::Future;
use std::pin::Pin;

use stemrelay_auth::AccessToken;
use stemrelay_protocol::{CommitInfo, FileMetadata, UploadSessionCursor};

use crate::TransferError;

/// Future returned by [`UploadApi`] calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransferError>> + Send + 'a>>;

/// The remote calls the transfer engine drives.
///
/// [`ContentClient`](crate::ContentClient) implements this over HTTP. Each
/// call either succeeds as a whole or fails; implementations must not retry.
pub trait UploadApi: Send + Sync {
    /// Writes a whole file in one call.
    fn upload<'a>(
        &'a self,
        token: &'a AccessToken,
        commit: &'a CommitInfo,
        data: Vec<u8>,
    ) -> ApiFuture<'a, FileMetadata>;

    /// Opens a session with its first chunk and returns the session id.
    fn start_session<'a>(&'a self, token: &'a AccessToken, data: Vec<u8>)
    -> ApiFuture<'a, String>;

    /// Appends a chunk at `cursor.offset`.
    fn append<'a>(
        &'a self,
        token: &'a AccessToken,
        cursor: &'a UploadSessionCursor,
        data: Vec<u8>,
    ) -> ApiFuture<'a, ()>;

    /// Commits the session's bytes as a file.
    fn finish<'a>(
        &'a self,
        token: &'a AccessToken,
        cursor: &'a UploadSessionCursor,
        commit: &'a CommitInfo,
    ) -> ApiFuture<'a, FileMetadata>;
}
