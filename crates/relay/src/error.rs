use stemrelay_archive::ArchiveError;
use stemrelay_auth::AuthError;
use stemrelay_transfer::TransferError;

/// Errors that abort a relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("no files were provided")]
    NoInput,

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("archive failed: {0}")]
    Archive(#[from] ArchiveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// HTTP-style status code for reporting this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::NoInput => 400,
            RelayError::Auth(_) | RelayError::Transfer(_) => 502,
            RelayError::Archive(_) | RelayError::Io(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(RelayError::NoInput.status_code(), 400);
        assert_eq!(RelayError::Auth(AuthError::MissingToken).status_code(), 502);
        assert_eq!(
            RelayError::Transfer(TransferError::InvalidState("x".into())).status_code(),
            502
        );
        assert_eq!(
            RelayError::Archive(ArchiveError::InvalidEntryName("..".into())).status_code(),
            500
        );
        assert_eq!(
            RelayError::Io(std::io::Error::other("disk")).status_code(),
            500
        );
    }

    #[test]
    fn messages() {
        assert_eq!(RelayError::NoInput.to_string(), "no files were provided");
        assert!(
            RelayError::Auth(AuthError::MissingToken)
                .to_string()
                .starts_with("authentication failed")
        );
    }
}
