use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use stemrelay_archive::{ArchiveInput, ArchiveProducer, TarGzProducer};
use stemrelay_auth::{OAuthCredentials, OAuthRefresher, TokenManager};
use stemrelay_transfer::{ContentClient, FileMetadata, TransferEngine, TransferRequest};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::form::FormFields;
use crate::naming;
use crate::staging::StagedFiles;

/// One submission: staged files plus the form that came with them.
///
/// The relay owns `files[..].path` from here on and deletes them when done.
#[derive(Debug, Clone, Default)]
pub struct RelayRequest {
    pub files: Vec<ArchiveInput>,
    pub form: FormFields,
}

/// Result of a successful relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeReport {
    /// Name built from the date and form fields.
    pub destination_name: String,
    pub remote_path: String,
    pub file_count: usize,
    /// Sum of the input file sizes.
    pub total_bytes: u64,
    /// Size of the uploaded archive.
    pub archive_bytes: u64,
    /// Metadata of the committed file; its name differs from
    /// `destination_name` if the remote side autorenamed it.
    pub remote: FileMetadata,
}

/// Runs the token, archive, transfer and cleanup pipeline.
pub struct Relay {
    tokens: Arc<TokenManager>,
    producer: Arc<dyn ArchiveProducer>,
    engine: TransferEngine,
    destination_folder: String,
    staging_dir: PathBuf,
}

impl Relay {
    pub fn new(
        tokens: Arc<TokenManager>,
        producer: Arc<dyn ArchiveProducer>,
        engine: TransferEngine,
        destination_folder: impl Into<String>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tokens,
            producer,
            engine,
            destination_folder: destination_folder.into(),
            staging_dir: staging_dir.into(),
        }
    }

    /// Wires the HTTP token refresher, content client and tar.gz producer
    /// from `config`. Call [`RelayConfig::validate`] first.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let credentials = OAuthCredentials {
            client_id: config.app_key.clone(),
            client_secret: config.app_secret.clone(),
            refresh_token: config.refresh_token.clone(),
        };
        let refresher = OAuthRefresher::new(credentials, config.request_timeout())?
            .with_token_url(config.token_url.clone());
        let client = ContentClient::new(config.request_timeout(), config.connect_timeout())?
            .with_base_url(config.content_url.clone());

        Ok(Self::new(
            Arc::new(TokenManager::new(refresher)),
            Arc::new(TarGzProducer::new(config.compression_level)),
            TransferEngine::new(Arc::new(client), config.chunk_size),
            config.destination_folder.clone(),
            config.staging_dir.clone(),
        ))
    }

    /// The shared token cache.
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub async fn relay(&self, request: RelayRequest) -> Result<OutcomeReport, RelayError> {
        self.relay_at(request, Utc::now()).await
    }

    /// Runs a relay with `now` as the submission time.
    pub async fn relay_at(
        &self,
        request: RelayRequest,
        now: DateTime<Utc>,
    ) -> Result<OutcomeReport, RelayError> {
        let file_count = request.files.len();
        match self.run(request, now).await {
            Ok(report) => {
                info!(
                    name = %report.destination_name,
                    files = report.file_count,
                    total_bytes = report.total_bytes,
                    archive_bytes = report.archive_bytes,
                    "relay complete"
                );
                Ok(report)
            }
            Err(e) => {
                error!(files = file_count, error = %e, "relay failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: RelayRequest,
        now: DateTime<Utc>,
    ) -> Result<OutcomeReport, RelayError> {
        let mut staged = StagedFiles::new();
        for file in &request.files {
            staged.register(&file.path);
        }

        if request.files.is_empty() {
            return Err(RelayError::NoInput);
        }
        let file_count = request.files.len();

        let token = self.tokens.get_valid_token().await?;

        let mut total_bytes = 0;
        for file in &request.files {
            total_bytes += tokio::fs::metadata(&file.path).await?.len();
        }
        info!(files = file_count, total_bytes, "relay accepted");

        let extension = self.producer.extension();
        let destination_name = naming::destination_name(&request.form, now, extension);
        let remote_path = naming::remote_path(&self.destination_folder, &destination_name);

        tokio::fs::create_dir_all(&self.staging_dir).await?;
        let archive_path = self
            .staging_dir
            .join(format!("archive-{}.{extension}", Uuid::new_v4()));
        staged.register(&archive_path);

        let manifest = request.form.to_manifest(now);
        let archive = self
            .producer
            .produce(request.files, manifest, &archive_path)
            .await?;
        info!(
            path = %archive.path.display(),
            size = archive.size,
            entries = archive.entries.len(),
            "archive ready"
        );

        let transfer = TransferRequest {
            source_path: archive.path.clone(),
            destination_path: remote_path.clone(),
            size_bytes: archive.size,
        };
        let remote = self.engine.upload(transfer, &token).await?;

        staged.cleanup();
        Ok(OutcomeReport {
            destination_name,
            remote_path,
            file_count,
            total_bytes,
            archive_bytes: archive.size,
            remote,
        })
    }
}
