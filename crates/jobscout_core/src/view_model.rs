use crate::{JobFilter, JobRecord, SessionError, SessionState};

/// Read-only view of the session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub session_id: Option<String>,
    /// Newest first.
    pub records: Vec<JobRecord>,
    pub last_error: Option<SessionError>,
    /// A stop was requested and awaits the user's confirmation.
    pub stop_pending: bool,
    /// Whether the stop affordance should be offered.
    pub can_stop: bool,
    pub disposed: bool,
}

impl SessionSnapshot {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn filtered<'a>(&'a self, filter: &'a JobFilter) -> impl Iterator<Item = &'a JobRecord> + 'a {
        self.records.iter().filter(move |record| filter.matches(record))
    }

    pub fn last_error_message(&self) -> Option<String> {
        self.last_error.as_ref().map(ToString::to_string)
    }
}
