//! Jobscout core: scraping-session state machine, result set and view-model helpers.
mod catalog;
mod effect;
mod error;
mod export;
mod history;
mod msg;
mod record;
mod request;
mod result_set;
mod state;
mod update;
mod view_model;

pub use catalog::Platform;
pub use effect::Effect;
pub use error::{
    CommandError, FaultKind, FieldError, IllegalStateError, SessionError, StopError, StreamFault,
    SubmissionError, SubmissionFailure, ValidationError,
};
pub use export::{ExportFormat, SerializeError, CSV_HEADERS};
pub use history::{paginate, HistoryPage, ScrapeHistoryEntry, HISTORY_PAGE_SIZE};
pub use msg::Msg;
pub use record::JobRecord;
pub use request::{RequestField, ScrapeRequest, MAX_PAGES, MIN_PAGES};
pub use result_set::{Filtered, JobFilter, JobResultSet, Records};
pub use state::{SessionModel, SessionState, StreamId};
pub use update::update;
pub use view_model::SessionSnapshot;
