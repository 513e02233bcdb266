use std::sync::{Arc, Mutex, PoisonError};

use futures_util::StreamExt;
use jobscout_core::{FaultKind, JobRecord, Msg, StreamFault, StreamId};
use jobscout_logging::{scout_debug, scout_info};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::sse::SseDecoder;
use crate::PushSource;

/// Receives what a subscription delivers.
///
/// `on_fault` fires at most once per subscription, and nothing is delivered
/// after it or after `close()` has returned.
pub trait StreamSink: Send + Sync {
    fn on_record(&self, stream: StreamId, record: JobRecord);
    fn on_fault(&self, stream: StreamId, fault: StreamFault);
}

/// Forwards deliveries into a controller's message queue.
pub struct ChannelStreamSink {
    tx: mpsc::UnboundedSender<Msg>,
}

impl ChannelStreamSink {
    pub fn new(tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self { tx }
    }
}

impl StreamSink for ChannelStreamSink {
    fn on_record(&self, stream: StreamId, record: JobRecord) {
        let _ = self.tx.send(Msg::RecordReceived { stream, record });
    }

    fn on_fault(&self, stream: StreamId, fault: StreamFault) {
        let _ = self.tx.send(Msg::StreamFaulted { stream, fault });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    #[error("subscription {0} was already opened")]
    AlreadyOpened(StreamId),
    #[error("session id must not be empty")]
    EmptySessionId,
    #[error("no async runtime available to drive the stream")]
    NoRuntime,
}

/// Serializes deliveries against `close()`.
#[derive(Debug, Default)]
struct Gate {
    closed: Mutex<bool>,
}

impl Gate {
    fn deliver(&self, deliver: impl FnOnce()) -> bool {
        let closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return false;
        }
        deliver();
        true
    }

    /// Delivers the terminal fault and closes the gate in one step.
    fn fault(&self, deliver: impl FnOnce()) {
        let mut closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        if !*closed {
            *closed = true;
            deliver();
        }
    }

    fn close(&self) -> bool {
        let mut closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        !std::mem::replace(&mut *closed, true)
    }

    fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unopened,
    Open,
    Closed,
}

/// One push-stream connection bound to a session id.
///
/// Faults are terminal and never retried here. Dropping the subscription
/// closes it.
pub struct StreamSubscription {
    id: StreamId,
    phase: Phase,
    gate: Arc<Gate>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl StreamSubscription {
    pub fn new(id: StreamId) -> Self {
        Self {
            id,
            phase: Phase::Unopened,
            gate: Arc::new(Gate::default()),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    /// True until the subscription is closed or has faulted.
    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open && !self.gate.is_closed()
    }

    /// Connects and starts delivering to `sink` on the current tokio runtime.
    pub fn open(
        &mut self,
        session_id: &str,
        source: Arc<dyn PushSource>,
        sink: Arc<dyn StreamSink>,
    ) -> Result<(), SubscriptionError> {
        if self.phase != Phase::Unopened {
            return Err(SubscriptionError::AlreadyOpened(self.id));
        }
        if session_id.trim().is_empty() {
            return Err(SubscriptionError::EmptySessionId);
        }
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SubscriptionError::NoRuntime)?;

        let id = self.id;
        scout_debug!("Stream {} opening for session {}", id, session_id);
        let session_id = session_id.to_owned();
        let gate = self.gate.clone();
        let cancel = self.cancel.clone();
        self.task = Some(runtime.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                outcome = pump(id, &session_id, source.as_ref(), sink.as_ref(), &gate) => {
                    if let Err(fault) = outcome {
                        gate.fault(|| sink.on_fault(id, fault));
                    }
                }
            }
        }));
        self.phase = Phase::Open;
        Ok(())
    }

    /// Idempotent. Once this returns, the sink hears nothing more and the
    /// connection task is gone.
    pub fn close(&mut self) {
        let was_open = self.gate.close();
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if was_open && self.phase == Phase::Open {
            scout_info!("Stream {} closed", self.id);
        }
        self.phase = Phase::Closed;
    }
}

impl Drop for StreamSubscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reads until the stream ends or fails. `Ok` means the gate closed under us.
async fn pump(
    id: StreamId,
    session_id: &str,
    source: &dyn PushSource,
    sink: &dyn StreamSink,
    gate: &Gate,
) -> Result<(), StreamFault> {
    let mut chunks = source.connect(session_id).await?;
    scout_info!("Stream {} connected", id);

    let mut decoder = SseDecoder::new();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        for event in decoder.feed(&chunk)? {
            if !event.is_message() {
                continue;
            }
            let record = JobRecord::from_json(&event.data)
                .map_err(|err| StreamFault::new(FaultKind::Decode, err.to_string()))?;
            if !gate.deliver(|| sink.on_record(id, record)) {
                return Ok(());
            }
        }
    }

    Err(StreamFault::new(
        FaultKind::ClosedByServer,
        "server closed the stream",
    ))
}
