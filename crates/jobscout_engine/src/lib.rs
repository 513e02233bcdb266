//! Jobscout engine: scraper API client, live result stream and session controller.
mod api;
mod config;
mod controller;
mod export;
mod identity;
mod source;
mod sse;
mod subscription;
mod types;

pub use api::{HttpScraperApi, ScraperApi};
pub use config::{ApiSettings, SettingsError, DEFAULT_BASE_URL};
pub use controller::{ControllerError, SessionController};
pub use export::{ensure_export_dir, export_results, ExportError, ExportSummary};
pub use identity::{Credentials, IdentityError, SessionIdentity, StaticIdentity};
pub use source::{ByteStream, HttpPushSource, PushSource};
pub use sse::{SseDecoder, SseEvent};
pub use subscription::{ChannelStreamSink, StreamSink, StreamSubscription, SubscriptionError};
pub use types::{ApiError, ApiFailure};
