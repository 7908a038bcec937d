//! HTTP client for the provider's content endpoints.
//!
//! Call arguments travel as JSON in the `Dropbox-API-Arg` header; the
//! request body carries raw file bytes.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use stemrelay_auth::AccessToken;
use stemrelay_protocol::constants::{API_ARG_HEADER, DEFAULT_CONTENT_URL};
use stemrelay_protocol::{
    CommitInfo, Endpoint, FileMetadata, SessionAppendArg, SessionFinishArg, SessionStartArg,
    SessionStartResult, UploadSessionCursor,
};
use tracing::debug;

use crate::TransferError;
use crate::api::{ApiFuture, UploadApi};

/// Content API client.
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
}

impl ContentClient {
    /// Creates a client against the default content URL.
    ///
    /// `timeout` bounds each whole call, so it has to cover uploading one
    /// full chunk.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, TransferError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_CONTENT_URL.to_string(),
        })
    }

    /// Sets a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Performs an authorized POST and returns the response body.
    async fn post<A: Serialize>(
        &self,
        endpoint: Endpoint,
        token: &AccessToken,
        arg: &A,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, TransferError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let auth = HeaderValue::from_str(&token.bearer())
            .map_err(|_| TransferError::InvalidHeader("Authorization"))?;
        let arg = HeaderValue::from_str(&header_safe_json(arg)?)
            .map_err(|_| TransferError::InvalidHeader(API_ARG_HEADER))?;

        debug!(%endpoint, bytes = body.len(), "content call");
        let resp = self
            .http
            .post(&url)
            .header(AUTHORIZATION, auth)
            .header(API_ARG_HEADER, arg)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransferError::Api {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }

    async fn upload_file(
        &self,
        token: &AccessToken,
        commit: &CommitInfo,
        data: Vec<u8>,
    ) -> Result<FileMetadata, TransferError> {
        let body = self.post(Endpoint::Upload, token, commit, data).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn start(&self, token: &AccessToken, data: Vec<u8>) -> Result<String, TransferError> {
        let arg = SessionStartArg { close: false };
        let body = self.post(Endpoint::SessionStart, token, &arg, data).await?;
        let result: SessionStartResult = serde_json::from_slice(&body)?;
        Ok(result.session_id)
    }

    async fn append_chunk(
        &self,
        token: &AccessToken,
        cursor: &UploadSessionCursor,
        data: Vec<u8>,
    ) -> Result<(), TransferError> {
        let arg = SessionAppendArg {
            cursor: cursor.clone(),
            close: false,
        };
        self.post(Endpoint::SessionAppend, token, &arg, data).await?;
        Ok(())
    }

    async fn commit(
        &self,
        token: &AccessToken,
        cursor: &UploadSessionCursor,
        commit: &CommitInfo,
    ) -> Result<FileMetadata, TransferError> {
        let arg = SessionFinishArg {
            cursor: cursor.clone(),
            commit: commit.clone(),
        };
        let body = self
            .post(Endpoint::SessionFinish, token, &arg, Vec::new())
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl UploadApi for ContentClient {
    fn upload<'a>(
        &'a self,
        token: &'a AccessToken,
        commit: &'a CommitInfo,
        data: Vec<u8>,
    ) -> ApiFuture<'a, FileMetadata> {
        Box::pin(self.upload_file(token, commit, data))
    }

    fn start_session<'a>(
        &'a self,
        token: &'a AccessToken,
        data: Vec<u8>,
    ) -> ApiFuture<'a, String> {
        Box::pin(self.start(token, data))
    }

    fn append<'a>(
        &'a self,
        token: &'a AccessToken,
        cursor: &'a UploadSessionCursor,
        data: Vec<u8>,
    ) -> ApiFuture<'a, ()> {
        Box::pin(self.append_chunk(token, cursor, data))
    }

    fn finish<'a>(
        &'a self,
        token: &'a AccessToken,
        cursor: &'a UploadSessionCursor,
        commit: &'a CommitInfo,
    ) -> ApiFuture<'a, FileMetadata> {
        Box::pin(self.commit(token, cursor, commit))
    }
}

/// Serializes `arg` as JSON with every non-ASCII character escaped, since
/// header values must be ASCII.
fn header_safe_json<A: Serialize>(arg: &A) -> Result<String, TransferError> {
    let json = serde_json::to_string(arg)?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    Ok(out)
}
