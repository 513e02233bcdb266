use std::fmt;

use crate::{RequestField, SessionState};

/// One rejected field of a [`crate::ScrapeRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: RequestField,
    pub message: String,
}

/// Client-side rejection of a scrape request, raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid scrape request: {}", summarize(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    /// Message for a given field, if that field was rejected.
    pub fn message_for(&self, field: RequestField) -> Option<&str> {
        self.fields
            .iter()
            .find(|err| err.field == field)
            .map(|err| err.message.as_str())
    }
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|err| err.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    Unauthorized,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidRequest,
}

/// The job-submission API refused to begin a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to start scraper: {message}")]
pub struct SubmissionError {
    pub kind: SubmissionFailure,
    pub message: String,
}

impl SubmissionError {
    pub fn new(kind: SubmissionFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    Connect,
    HttpStatus(u16),
    Transport,
    ClosedByServer,
    Decode,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Connect => write!(f, "connection failed"),
            FaultKind::HttpStatus(code) => write!(f, "http status {code}"),
            FaultKind::Transport => write!(f, "transport error"),
            FaultKind::ClosedByServer => write!(f, "closed by server"),
            FaultKind::Decode => write!(f, "malformed payload"),
        }
    }
}

/// Terminal failure of a push-stream subscription.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("lost connection to live results ({kind}): {message}")]
pub struct StreamFault {
    pub kind: FaultKind,
    pub message: String,
}

impl StreamFault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The stop-session request failed. Never blocks local cleanup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to stop scraper: {message}")]
pub struct StopError {
    pub status: Option<u16>,
    pub message: String,
}

/// An operation was attempted in a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct IllegalStateError {
    pub operation: &'static str,
    pub state: SessionState,
    pub disposed: bool,
}

impl fmt::Display for IllegalStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disposed {
            write!(f, "cannot {}: session controller was disposed", self.operation)
        } else {
            write!(f, "cannot {} while session is {}", self.operation, self.state)
        }
    }
}

/// Error surfaced to the presentation layer as `last_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Stream(#[from] StreamFault),
    #[error(transparent)]
    Stop(#[from] StopError),
}

/// Synchronous rejection of a user command. Leaves the model untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    IllegalState(#[from] IllegalStateError),
}
