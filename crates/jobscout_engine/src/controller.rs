use std::future::Future;
use std::sync::Arc;

use jobscout_core::{
    update, CommandError, Effect, FaultKind, JobResultSet, Msg, ScrapeRequest, SessionModel,
    SessionSnapshot, SessionState, StopError, StreamFault, StreamId, SubmissionError,
    SubmissionFailure,
};
use jobscout_logging::{scout_debug, scout_error, scout_info, scout_warn, SessionTag};
use tokio::sync::mpsc;

use crate::subscription::{ChannelStreamSink, StreamSubscription};
use crate::{Credentials, IdentityError, PushSource, ScraperApi, SessionIdentity};

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Owns one scraping session at a time: the session model, the live stream
/// subscription and the in-flight start/stop calls.
///
/// Every stream delivery and HTTP response comes back as a [`Msg`] on an
/// internal queue and is applied by [`SessionController::next_event`] or
/// [`SessionController::pump`], so all transitions happen on the owner.
/// Dropping the controller disposes it.
pub struct SessionController {
    model: SessionModel,
    api: Arc<dyn ScraperApi>,
    source: Arc<dyn PushSource>,
    identity: Arc<dyn SessionIdentity>,
    credentials: Option<Credentials>,
    log_tag: Option<SessionTag>,
    subscription: Option<StreamSubscription>,
    msg_tx: mpsc::UnboundedSender<Msg>,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
}

impl SessionController {
    pub fn new(
        api: Arc<dyn ScraperApi>,
        source: Arc<dyn PushSource>,
        identity: Arc<dyn SessionIdentity>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            model: SessionModel::new(),
            api,
            source,
            identity,
            credentials: None,
            log_tag: None,
            subscription: None,
            msg_tx,
            msg_rx,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.model.view()
    }

    pub fn state(&self) -> SessionState {
        self.model.session()
    }

    pub fn results(&self) -> &JobResultSet {
        self.model.results()
    }

    /// Validates `request`, opens the live stream and submits the request.
    ///
    /// Rejections are synchronous and leave the controller as it was.
    pub fn start(&mut self, request: ScrapeRequest) -> Result<(), ControllerError> {
        let credentials = if self.model.session() == SessionState::Idle && !self.model.is_disposed()
        {
            let credentials = self.identity.resolve()?;
            if credentials.session_id.trim().is_empty() {
                return Err(IdentityError::MissingUserId.into());
            }
            Some(credentials)
        } else {
            None
        };
        let session_id = credentials
            .as_ref()
            .map(|credentials| credentials.session_id.clone())
            .unwrap_or_default();

        let effects = self.apply(Msg::StartClicked {
            request,
            session_id: session_id.clone(),
        })?;
        self.log_tag = Some(SessionTag::enter(&session_id));
        self.credentials = credentials;
        self.run_effects(effects);
        Ok(())
    }

    /// First step of a stop: asks the presentation layer for confirmation.
    pub fn request_stop(&mut self) -> Result<(), ControllerError> {
        self.command(Msg::StopClicked)
    }

    pub fn confirm_stop(&mut self) -> Result<(), ControllerError> {
        self.command(Msg::StopConfirmed)
    }

    pub fn cancel_stop(&mut self) -> Result<(), ControllerError> {
        self.command(Msg::StopCancelled)
    }

    pub fn acknowledge_error(&mut self) -> Result<(), ControllerError> {
        self.command(Msg::ErrorAcknowledged)
    }

    /// Closes the live stream unconditionally, whatever the state and
    /// whatever network calls are still pending. Idempotent.
    pub fn dispose(&mut self) {
        let (model, result) = update(std::mem::take(&mut self.model), Msg::Disposed);
        self.model = model;
        if let Ok(effects) = result {
            self.run_effects(effects);
        }
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
        self.credentials = None;
        self.log_tag = None;
    }

    /// Waits for the next stream delivery or HTTP response and applies it.
    /// Returns `None` once the controller is disposed.
    pub async fn next_event(&mut self) -> Option<SessionSnapshot> {
        if self.model.is_disposed() {
            return None;
        }
        let msg = self.msg_rx.recv().await?;
        self.handle_event(msg);
        Some(self.model.view())
    }

    /// Applies everything already queued without waiting. Returns whether the
    /// snapshot changed.
    pub fn pump(&mut self) -> bool {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.handle_event(msg);
        }
        self.model.consume_dirty()
    }

    fn command(&mut self, msg: Msg) -> Result<(), ControllerError> {
        let effects = self.apply(msg)?;
        self.run_effects(effects);
        Ok(())
    }

    fn handle_event(&mut self, msg: Msg) {
        match self.apply(msg) {
            Ok(effects) => self.run_effects(effects),
            Err(err) => scout_error!("Event rejected by session model: {}", err),
        }
    }

    fn apply(&mut self, msg: Msg) -> Result<Vec<Effect>, CommandError> {
        let (model, result) = update(std::mem::take(&mut self.model), msg);
        self.model = model;
        result
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenStream { stream, session_id } => self.open_stream(stream, &session_id),
                Effect::SubmitStart { stream, request } => self.submit_start(stream, request),
                Effect::CloseStream { stream } => self.close_stream(stream),
                Effect::SubmitStop { session_id } => self.submit_stop(&session_id),
            }
        }
    }

    fn open_stream(&mut self, stream: StreamId, session_id: &str) {
        if let Some(mut stale) = self.subscription.take() {
            scout_warn!("Closing leftover stream {} before opening {}", stale.id(), stream);
            stale.close();
        }
        let mut subscription = StreamSubscription::new(stream);
        let sink = Arc::new(ChannelStreamSink::new(self.msg_tx.clone()));
        match subscription.open(session_id, self.source.clone(), sink) {
            Ok(()) => self.subscription = Some(subscription),
            Err(err) => {
                scout_error!("Could not open stream {}: {}", stream, err);
                let _ = self.msg_tx.send(Msg::StreamFaulted {
                    stream,
                    fault: StreamFault::new(FaultKind::Connect, err.to_string()),
                });
            }
        }
    }

    fn close_stream(&mut self, stream: StreamId) {
        match self.subscription.take() {
            Some(mut subscription) if subscription.id() == stream => subscription.close(),
            other => {
                scout_debug!("Stream {} already released", stream);
                self.subscription = other;
            }
        }
    }

    fn submit_start(&mut self, stream: StreamId, request: ScrapeRequest) {
        let Some(credentials) = self.credentials.clone() else {
            let _ = self.msg_tx.send(Msg::SubmissionRejected {
                stream,
                error: SubmissionError::new(SubmissionFailure::Unauthorized, "no credentials"),
            });
            return;
        };
        let api = self.api.clone();
        let tx = self.msg_tx.clone();
        let spawned = try_spawn(async move {
            let msg = match api.start_session(&request, &credentials).await {
                Ok(()) => {
                    scout_info!("Scraper started, listening for real-time jobs");
                    Msg::SubmissionAccepted { stream }
                }
                Err(error) => Msg::SubmissionRejected { stream, error },
            };
            let _ = tx.send(msg);
        });
        if !spawned {
            let _ = self.msg_tx.send(Msg::SubmissionRejected {
                stream,
                error: SubmissionError::new(SubmissionFailure::Network, "no async runtime"),
            });
        }
    }

    fn submit_stop(&mut self, session_id: &str) {
        let Some(credentials) = self.credentials.clone() else {
            let _ = self.msg_tx.send(Msg::StopAcknowledged {
                result: Err(StopError {
                    status: None,
                    message: format!("no credentials for session {session_id}"),
                }),
            });
            return;
        };
        let api = self.api.clone();
        let tx = self.msg_tx.clone();
        let spawned = try_spawn(async move {
            let result = api.stop_session(&credentials).await;
            let _ = tx.send(Msg::StopAcknowledged { result });
        });
        if !spawned {
            let _ = self.msg_tx.send(Msg::StopAcknowledged {
                result: Err(StopError {
                    status: None,
                    message: "no async runtime".to_string(),
                }),
            });
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn try_spawn<F>(future: F) -> bool
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(future);
            true
        }
        Err(_) => false,
    }
}
