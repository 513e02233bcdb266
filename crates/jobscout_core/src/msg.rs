use crate::{JobRecord, ScrapeRequest, StopError, StreamFault, StreamId, SubmissionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted a scrape request for the resolved session id.
    StartClicked {
        request: ScrapeRequest,
        session_id: String,
    },
    /// The job-submission API acknowledged the start request.
    SubmissionAccepted { stream: StreamId },
    /// The job-submission API refused the start request.
    SubmissionRejected {
        stream: StreamId,
        error: SubmissionError,
    },
    /// A record arrived on a stream subscription.
    RecordReceived { stream: StreamId, record: JobRecord },
    /// A stream subscription failed; it delivers nothing more.
    StreamFaulted { stream: StreamId, fault: StreamFault },
    /// User asked to stop; needs confirmation.
    StopClicked,
    /// User confirmed the pending stop.
    StopConfirmed,
    /// User dismissed the pending stop.
    StopCancelled,
    /// The stop-session request finished, successfully or not.
    StopAcknowledged { result: Result<(), StopError> },
    /// User dismissed the current error.
    ErrorAcknowledged,
    /// The owning context is going away.
    Disposed,
}

impl Msg {
    /// User commands are rejected synchronously when illegal; events are not.
    pub(crate) fn operation(&self) -> Option<&'static str> {
        match self {
            Msg::StartClicked { .. } => Some("start a session"),
            Msg::StopClicked => Some("stop the scraper"),
            Msg::StopConfirmed => Some("confirm stop"),
            Msg::StopCancelled => Some("cancel stop"),
            Msg::ErrorAcknowledged => Some("acknowledge an error"),
            _ => None,
        }
    }
}
