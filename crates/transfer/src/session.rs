//! Upload session state machine.
//!
//! ```text
//! NotStarted --start--> Open(id, off) --append--> Open(id, off + n)
//!                            |
//!                            +--finish--> Finished
//! any unfinished state --fail--> Failed
//! ```

use stemrelay_protocol::UploadSessionCursor;

use crate::TransferError;

/// Where a session-based transfer currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    NotStarted,
    /// `offset` is the number of bytes the remote has acknowledged.
    Open { session_id: String, offset: u64 },
    Finished { session_id: String, offset: u64 },
    Failed {
        session_id: Option<String>,
        offset: u64,
    },
}

/// Tracks one upload session and rejects out-of-order transitions.
#[derive(Debug, Default)]
pub struct UploadSession {
    state: SessionState,
    appends: usize,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Records a successful start call that carried `acknowledged` bytes.
    pub fn start(&mut self, session_id: String, acknowledged: u64) -> Result<(), TransferError> {
        match self.state {
            SessionState::NotStarted => {
                self.state = SessionState::Open {
                    session_id,
                    offset: acknowledged,
                };
                Ok(())
            }
            _ => Err(self.invalid("start")),
        }
    }

    /// Cursor for the next append or finish call.
    pub fn cursor(&self) -> Result<UploadSessionCursor, TransferError> {
        match &self.state {
            SessionState::Open { session_id, offset } => Ok(UploadSessionCursor {
                session_id: session_id.clone(),
                offset: *offset,
            }),
            _ => Err(self.invalid("cursor")),
        }
    }

    /// Fails unless the next chunk starts exactly at the acknowledged offset.
    pub fn check_offset(&self, chunk_offset: u64) -> Result<(), TransferError> {
        match self.state {
            SessionState::Open { offset, .. } if offset == chunk_offset => Ok(()),
            SessionState::Open { offset, .. } => Err(TransferError::OffsetMismatch {
                expected: offset,
                actual: chunk_offset,
            }),
            _ => Err(self.invalid("append")),
        }
    }

    /// Records a successful append of `acknowledged` bytes. Returns the new offset.
    pub fn append(&mut self, acknowledged: u64) -> Result<u64, TransferError> {
        if let SessionState::Open { offset, .. } = &mut self.state {
            *offset += acknowledged;
            let advanced = *offset;
            self.appends += 1;
            return Ok(advanced);
        }
        Err(self.invalid("append"))
    }

    /// Records a successful finish call.
    pub fn finish(&mut self) -> Result<(), TransferError> {
        match std::mem::take(&mut self.state) {
            SessionState::Open { session_id, offset } => {
                self.state = SessionState::Finished { session_id, offset };
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.invalid("finish"))
            }
        }
    }

    /// Marks the transfer as aborted.
    ///
    /// Returns the cursor of a session that was left open on the remote side,
    /// if any. Finished sessions are not touched.
    pub fn fail(&mut self) -> Option<UploadSessionCursor> {
        match std::mem::take(&mut self.state) {
            SessionState::Open { session_id, offset } => {
                self.state = SessionState::Failed {
                    session_id: Some(session_id.clone()),
                    offset,
                };
                Some(UploadSessionCursor { session_id, offset })
            }
            SessionState::NotStarted => {
                self.state = SessionState::Failed {
                    session_id: None,
                    offset: 0,
                };
                None
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Acknowledged bytes so far.
    pub fn offset(&self) -> u64 {
        match self.state {
            SessionState::NotStarted => 0,
            SessionState::Open { offset, .. }
            | SessionState::Finished { offset, .. }
            | SessionState::Failed { offset, .. } => offset,
        }
    }

    /// Number of successful append calls.
    pub fn append_count(&self) -> usize {
        self.appends
    }

    fn invalid(&self, transition: &str) -> TransferError {
        TransferError::InvalidState(format!("cannot {transition} from {:?}", self.state))
    }
}
