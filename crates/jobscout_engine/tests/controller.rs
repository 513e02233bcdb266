use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use jobscout_core::{
    CommandError, FaultKind, RequestField, ScrapeRequest, SessionError, SessionSnapshot,
    SessionState, StopError, StreamFault, SubmissionError, SubmissionFailure,
};
use jobscout_engine::{
    ByteStream, ControllerError, Credentials, IdentityError, PushSource, ScraperApi,
    SessionController, StaticIdentity,
};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

type Chunk = Result<Bytes, StreamFault>;

#[derive(Default)]
struct FakeApi {
    reject_start: Option<SubmissionError>,
    fail_stop: Option<StopError>,
    starts: Mutex<Vec<(ScrapeRequest, Credentials)>>,
    stops: Mutex<Vec<Credentials>>,
}

#[async_trait::async_trait]
impl ScraperApi for FakeApi {
    async fn start_session(
        &self,
        request: &ScrapeRequest,
        credentials: &Credentials,
    ) -> Result<(), SubmissionError> {
        self.starts
            .lock()
            .unwrap()
            .push((request.clone(), credentials.clone()));
        match &self.reject_start {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn stop_session(&self, credentials: &Credentials) -> Result<(), StopError> {
        self.stops.lock().unwrap().push(credentials.clone());
        match &self.fail_stop {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// One accepted stream connection, driven by the test.
struct Connection {
    session_id: String,
    chunks: mpsc::UnboundedSender<Chunk>,
}

impl Connection {
    fn push_record(&self, id: &str, title: &str) {
        let frame = format!("data: {{\"publicId\":\"{id}\",\"title\":\"{title}\"}}\n\n");
        self.chunks.send(Ok(Bytes::from(frame))).unwrap();
    }

    async fn assert_released(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.chunks.closed())
            .await
            .expect("stream connection released");
    }
}

struct FakeSource {
    connections: mpsc::UnboundedSender<Connection>,
}

#[async_trait::async_trait]
impl PushSource for FakeSource {
    async fn connect(&self, session_id: &str) -> Result<ByteStream, StreamFault> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections
            .send(Connection {
                session_id: session_id.to_string(),
                chunks: tx,
            })
            .map_err(|err| StreamFault::new(FaultKind::Connect, err.to_string()))?;
        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (chunk, rx))
        })
        .boxed())
    }
}

struct Harness {
    controller: SessionController,
    api: Arc<FakeApi>,
    connections: mpsc::UnboundedReceiver<Connection>,
}

impl Harness {
    fn new(api: FakeApi) -> Self {
        Self::with_identity(api, StaticIdentity::new("user-1", "tok-123"))
    }

    fn with_identity(api: FakeApi, identity: StaticIdentity) -> Self {
        jobscout_logging::initialize_for_tests();
        let api = Arc::new(api);
        let (tx, connections) = mpsc::unbounded_channel();
        let controller = SessionController::new(
            api.clone(),
            Arc::new(FakeSource { connections: tx }),
            Arc::new(identity),
        );
        Self {
            controller,
            api,
            connections,
        }
    }

    async fn next_connection(&mut self) -> Connection {
        tokio::time::timeout(Duration::from_secs(5), self.connections.recv())
            .await
            .expect("stream connected in time")
            .expect("source alive")
    }

    async fn settle_until(&mut self, done: impl Fn(&SessionSnapshot) -> bool) -> SessionSnapshot {
        let snapshot = self.controller.snapshot();
        if done(&snapshot) {
            return snapshot;
        }
        loop {
            let snapshot = tokio::time::timeout(Duration::from_secs(5), self.controller.next_event())
                .await
                .expect("session settled in time")
                .expect("controller not disposed");
            if done(&snapshot) {
                return snapshot;
            }
        }
    }

    async fn start_streaming(&mut self) -> Connection {
        self.controller.start(engineer_request()).unwrap();
        let connection = self.next_connection().await;
        self.settle_until(|s| s.state == SessionState::Streaming).await;
        connection
    }
}

fn engineer_request() -> ScrapeRequest {
    ScrapeRequest::new("p1", "Engineer", "Toronto", 5)
}

fn titles(snapshot: &SessionSnapshot) -> Vec<&str> {
    snapshot.records.iter().map(|r| r.title.as_str()).collect()
}

#[tokio::test]
async fn start_goes_through_starting_to_streaming() {
    let mut harness = Harness::new(FakeApi::default());

    harness.controller.start(engineer_request()).unwrap();
    let snapshot = harness.controller.snapshot();
    assert_eq!(snapshot.state, SessionState::Starting);
    assert_eq!(snapshot.session_id.as_deref(), Some("user-1"));
    assert!(snapshot.can_stop);

    let connection = harness.next_connection().await;
    assert_eq!(connection.session_id, "user-1");

    let snapshot = harness
        .settle_until(|s| s.state == SessionState::Streaming)
        .await;
    assert_eq!(snapshot.record_count(), 0);
    assert_eq!(snapshot.last_error, None);

    let starts = harness.api.starts.lock().unwrap();
    assert_eq!(starts.len(), 1);
    assert_eq!(starts[0].0, engineer_request());
    assert_eq!(starts[0].1.bearer_token, "tok-123");
}

#[tokio::test]
async fn repeated_public_id_replaces_and_moves_to_front() {
    let mut harness = Harness::new(FakeApi::default());
    let connection = harness.start_streaming().await;

    connection.push_record("j1", "A");
    connection.push_record("j2", "X");
    connection.push_record("j1", "B");

    let snapshot = harness
        .settle_until(|s| titles(s) == ["B", "X"])
        .await;
    assert_eq!(snapshot.records[0].public_id, "j1");
    assert_eq!(harness.controller.results().len(), 2);
}

#[tokio::test]
async fn invalid_request_is_rejected_without_opening_a_stream() {
    let mut harness = Harness::new(FakeApi::default());

    let err = harness
        .controller
        .start(ScrapeRequest::new("p1", "Engineer", "Toronto", 0))
        .unwrap_err();
    match err {
        ControllerError::Command(CommandError::Validation(validation)) => {
            assert!(validation.message_for(RequestField::MaxPages).is_some());
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(harness.controller.state(), SessionState::Idle);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(harness.connections.try_recv().is_err());
    assert!(harness.api.starts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_credentials_reject_start() {
    let mut harness =
        Harness::with_identity(FakeApi::default(), StaticIdentity::new("user-1", ""));

    let err = harness.controller.start(engineer_request()).unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Identity(IdentityError::MissingToken)
    ));
    assert_eq!(harness.controller.state(), SessionState::Idle);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(harness.connections.try_recv().is_err());
}

#[tokio::test]
async fn fault_keeps_records_and_requires_acknowledgement() {
    let mut harness = Harness::new(FakeApi::default());
    let connection = harness.start_streaming().await;

    connection.push_record("j1", "Engineer");
    harness.settle_until(|s| s.record_count() == 1).await;
    connection
        .chunks
        .send(Err(StreamFault::new(FaultKind::Transport, "reset by peer")))
        .unwrap();

    let snapshot = harness
        .settle_until(|s| s.state == SessionState::Errored)
        .await;
    assert_eq!(titles(&snapshot), ["Engineer"]);
    assert!(matches!(
        snapshot.last_error,
        Some(SessionError::Stream(StreamFault {
            kind: FaultKind::Transport,
            ..
        }))
    ));
    assert!(!snapshot.can_stop);
    connection.assert_released().await;

    let err = harness.controller.start(engineer_request()).unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Command(CommandError::IllegalState(_))
    ));

    harness.controller.acknowledge_error().unwrap();
    assert_eq!(harness.controller.state(), SessionState::Idle);
    assert_eq!(harness.controller.snapshot().record_count(), 1);

    harness.controller.start(engineer_request()).unwrap();
    let second = harness.next_connection().await;
    assert_eq!(second.session_id, "user-1");
    assert_eq!(harness.controller.snapshot().record_count(), 0);
}

#[tokio::test]
async fn rejected_start_moves_to_errored_and_closes_stream() {
    let mut harness = Harness::new(FakeApi {
        reject_start: Some(SubmissionError::new(
            SubmissionFailure::Unauthorized,
            "token expired",
        )),
        ..FakeApi::default()
    });

    harness.controller.start(engineer_request()).unwrap();
    let connection = harness.next_connection().await;
    let snapshot = harness
        .settle_until(|s| s.state == SessionState::Errored)
        .await;
    assert_eq!(
        snapshot.last_error_message().as_deref(),
        Some("failed to start scraper: token expired")
    );
    connection.assert_released().await;
}

#[tokio::test]
async fn confirmed_stop_closes_stream_and_returns_to_idle() {
    let mut harness = Harness::new(FakeApi::default());
    let connection = harness.start_streaming().await;
    connection.push_record("j1", "Engineer");
    harness.settle_until(|s| s.record_count() == 1).await;

    harness.controller.request_stop().unwrap();
    assert!(harness.controller.snapshot().stop_pending);
    assert_eq!(harness.controller.state(), SessionState::Streaming);

    harness.controller.confirm_stop().unwrap();
    assert_eq!(harness.controller.state(), SessionState::Stopping);
    connection.assert_released().await;

    let snapshot = harness.settle_until(|s| s.state == SessionState::Idle).await;
    assert_eq!(snapshot.last_error, None);
    assert!(!snapshot.stop_pending);
    assert_eq!(titles(&snapshot), ["Engineer"]);
    assert_eq!(harness.api.stops.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_stop_still_reaches_idle() {
    let mut harness = Harness::new(FakeApi {
        fail_stop: Some(StopError {
            status: Some(504),
            message: "gateway timeout".to_string(),
        }),
        ..FakeApi::default()
    });
    let connection = harness.start_streaming().await;

    harness.controller.request_stop().unwrap();
    harness.controller.confirm_stop().unwrap();
    connection.assert_released().await;

    let snapshot = harness.settle_until(|s| s.state == SessionState::Idle).await;
    match snapshot.last_error {
        Some(SessionError::Stop(err)) => assert_eq!(err.status, Some(504)),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_stop_keeps_streaming() {
    let mut harness = Harness::new(FakeApi::default());
    let connection = harness.start_streaming().await;

    harness.controller.request_stop().unwrap();
    harness.controller.cancel_stop().unwrap();
    assert!(!harness.controller.snapshot().stop_pending);
    assert!(harness.controller.confirm_stop().is_err());

    connection.push_record("j1", "Engineer");
    let snapshot = harness.settle_until(|s| s.record_count() == 1).await;
    assert_eq!(snapshot.state, SessionState::Streaming);
    assert!(harness.api.stops.lock().unwrap().is_empty());
}

#[tokio::test]
async fn stop_is_illegal_when_idle() {
    let mut harness = Harness::new(FakeApi::default());
    let err = harness.controller.request_stop().unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Command(CommandError::IllegalState(_))
    ));
    assert!(!harness.controller.pump());
}

#[tokio::test]
async fn dispose_closes_stream_and_rejects_further_commands() {
    let mut harness = Harness::new(FakeApi::default());
    let connection = harness.start_streaming().await;

    harness.controller.dispose();
    connection.assert_released().await;
    harness.controller.dispose();

    let snapshot = harness.controller.snapshot();
    assert!(snapshot.disposed);
    assert!(!snapshot.can_stop);
    match harness.controller.start(engineer_request()) {
        Err(ControllerError::Command(CommandError::IllegalState(err))) => assert!(err.disposed),
        other => panic!("unexpected {other:?}"),
    }
    assert!(harness.controller.next_event().await.is_none());
}

#[tokio::test]
async fn dropping_the_controller_closes_stream() {
    let mut harness = Harness::new(FakeApi::default());
    let connection = harness.start_streaming().await;

    drop(harness.controller);
    connection.assert_released().await;
}
