use std::fmt;

use crate::view_model::SessionSnapshot;
use crate::{JobRecord, JobResultSet, SessionError};

/// Identifies one stream subscription. Each session start allocates a new one,
/// so events from a subscription the user no longer owns can be told apart.
pub type StreamId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Starting,
    Streaming,
    Stopping,
    Errored,
}

impl SessionState {
    /// States in which pushed records are accepted and a stop may be requested.
    pub fn is_live(self) -> bool {
        matches!(self, SessionState::Starting | SessionState::Streaming)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Starting => "starting",
            SessionState::Streaming => "streaming",
            SessionState::Stopping => "stopping",
            SessionState::Errored => "errored",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionModel {
    session: SessionState,
    session_id: Option<String>,
    active_stream: Option<StreamId>,
    last_stream: StreamId,
    results: JobResultSet,
    last_error: Option<SessionError>,
    stop_pending: bool,
    disposed: bool,
    dirty: bool,
}

impl SessionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn active_stream(&self) -> Option<StreamId> {
        self.active_stream
    }

    pub fn results(&self) -> &JobResultSet {
        &self.results
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn stop_pending(&self) -> bool {
        self.stop_pending
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn view(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.session,
            session_id: self.session_id.clone(),
            records: self.results.iter().cloned().collect(),
            last_error: self.last_error.clone(),
            stop_pending: self.stop_pending,
            can_stop: self.session.is_live() && !self.disposed,
            disposed: self.disposed,
        }
    }

    /// Returns whether the model changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn owns(&self, stream: StreamId) -> bool {
        self.active_stream == Some(stream)
    }

    pub(crate) fn begin_session(&mut self, session_id: String) -> StreamId {
        self.last_stream += 1;
        let stream = self.last_stream;
        self.session = SessionState::Starting;
        self.session_id = Some(session_id);
        self.active_stream = Some(stream);
        self.results.clear();
        self.last_error = None;
        self.stop_pending = false;
        self.dirty = true;
        stream
    }

    pub(crate) fn set_session(&mut self, session: SessionState) {
        if self.session != session {
            self.session = session;
            self.dirty = true;
        }
    }

    pub(crate) fn ingest(&mut self, record: JobRecord) {
        self.results.ingest(record);
        self.dirty = true;
    }

    /// Moves to `Errored`, detaching the active stream. Results are kept.
    pub(crate) fn fail(&mut self, error: SessionError) -> Option<StreamId> {
        self.session = SessionState::Errored;
        self.last_error = Some(error);
        self.stop_pending = false;
        self.dirty = true;
        self.active_stream.take()
    }

    pub(crate) fn set_stop_pending(&mut self, pending: bool) {
        if self.stop_pending != pending {
            self.stop_pending = pending;
            self.dirty = true;
        }
    }

    pub(crate) fn begin_stop(&mut self) -> Option<StreamId> {
        self.session = SessionState::Stopping;
        self.stop_pending = false;
        self.dirty = true;
        self.active_stream.take()
    }

    pub(crate) fn finish(&mut self, error: Option<SessionError>) {
        self.session = SessionState::Idle;
        self.last_error = error;
        self.dirty = true;
    }

    pub(crate) fn dispose(&mut self) -> Option<StreamId> {
        self.disposed = true;
        self.session = SessionState::Idle;
        self.stop_pending = false;
        self.dirty = true;
        self.active_stream.take()
    }
}
