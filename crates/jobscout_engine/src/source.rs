use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use jobscout_core::{FaultKind, StreamFault};
use reqwest::header::{ACCEPT, CACHE_CONTROL};

use crate::ApiSettings;

pub type ByteStream = BoxStream<'static, Result<Bytes, StreamFault>>;

/// Opens the raw byte stream behind a push subscription.
#[async_trait::async_trait]
pub trait PushSource: Send + Sync {
    async fn connect(&self, session_id: &str) -> Result<ByteStream, StreamFault>;
}

/// `GET {base}/api/scraper/stream/{session_id}` as server-sent events.
#[derive(Debug, Clone)]
pub struct HttpPushSource {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl HttpPushSource {
    pub fn new(settings: ApiSettings) -> Result<Self, StreamFault> {
        // No overall timeout: the stream stays open for the whole session.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| StreamFault::new(FaultKind::Connect, err.to_string()))?;
        Ok(Self { settings, client })
    }
}

#[async_trait::async_trait]
impl PushSource for HttpPushSource {
    async fn connect(&self, session_id: &str) -> Result<ByteStream, StreamFault> {
        let url = self
            .settings
            .endpoint(&["api", "scraper", "stream", session_id])
            .map_err(|err| StreamFault::new(FaultKind::Connect, err.to_string()))?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|err| StreamFault::new(FaultKind::Connect, err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamFault::new(
                FaultKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|err| StreamFault::new(FaultKind::Transport, err.to_string())))
            .boxed())
    }
}
