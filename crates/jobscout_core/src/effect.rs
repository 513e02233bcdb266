use crate::{ScrapeRequest, StreamId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenStream { stream: StreamId, session_id: String },
    SubmitStart { stream: StreamId, request: ScrapeRequest },
    CloseStream { stream: StreamId },
    SubmitStop { session_id: String },
}
