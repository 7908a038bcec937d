//! Relays a batch of submitted stems to the storage provider.
//!
//! [`Relay`] runs one request end to end: it gets a token from the shared
//! [`TokenManager`](stemrelay_auth::TokenManager), packs the staged inputs and
//! a manifest into one archive, hands the archive to the
//! [`TransferEngine`](stemrelay_transfer::TransferEngine), and deletes every
//! staged file whatever the outcome.

mod config;
mod error;
mod form;
mod naming;
mod orchestrator;
mod response;
mod staging;

pub use config::{ConfigError, RelayConfig};
pub use error::RelayError;
pub use form::FormFields;
pub use naming::{destination_name, remote_path, sanitize};
pub use orchestrator::{OutcomeReport, Relay, RelayRequest};
pub use response::RelayResponse;
pub use staging::{StagedFiles, stage_file};
pub use stemrelay_archive::ArchiveInput;
