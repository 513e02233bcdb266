use jobscout_logging::{scout_debug, scout_info, scout_trace, scout_warn};

use crate::{
    CommandError, Effect, IllegalStateError, Msg, SessionError, SessionModel, SessionState,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// User commands that are not allowed in the current state, or that carry an
/// invalid request, come back as `Err` and leave `state` untouched. Events
/// that no longer apply (stale stream, wrong state) are dropped.
pub fn update(mut state: SessionModel, msg: Msg) -> (SessionModel, Result<Vec<Effect>, CommandError>) {
    if state.is_disposed() {
        let result = match msg.operation() {
            Some(operation) => Err(illegal(&state, operation).into()),
            None => Ok(Vec::new()),
        };
        return (state, result);
    }

    let result = match msg {
        Msg::StartClicked {
            request,
            session_id,
        } => {
            if state.session() != SessionState::Idle {
                return reject(state, "start a session");
            }
            if let Err(err) = request.validate() {
                return (state, Err(err.into()));
            }
            let stream = state.begin_session(session_id.clone());
            scout_info!(
                "Starting session stream={} platform={} query={:?} location={:?} max_pages={}",
                stream,
                request.platform_id,
                request.query,
                request.location,
                request.max_pages
            );
            Ok(vec![
                Effect::OpenStream { stream, session_id },
                Effect::SubmitStart { stream, request },
            ])
        }
        Msg::SubmissionAccepted { stream } => {
            if state.owns(stream) && state.session() == SessionState::Starting {
                state.set_session(SessionState::Streaming);
            } else {
                scout_debug!("Ignoring stale submission ack for stream {}", stream);
            }
            Ok(Vec::new())
        }
        Msg::SubmissionRejected { stream, error } => {
            if state.owns(stream) && state.session() == SessionState::Starting {
                scout_warn!("Start rejected: {}", error);
                let detached = state.fail(SessionError::Submission(error));
                Ok(detached
                    .map(|stream| vec![Effect::CloseStream { stream }])
                    .unwrap_or_default())
            } else {
                scout_debug!("Ignoring submission rejection for stream {}: {}", stream, error);
                Ok(Vec::new())
            }
        }
        Msg::RecordReceived { stream, record } => {
            if state.owns(stream) && state.session().is_live() {
                state.ingest(record);
            } else {
                scout_trace!(
                    "Dropping record {} from stream {} in state {}",
                    record.public_id,
                    stream,
                    state.session()
                );
            }
            Ok(Vec::new())
        }
        Msg::StreamFaulted { stream, fault } => {
            if state.owns(stream) && state.session().is_live() {
                scout_warn!("Stream {} faulted: {}", stream, fault);
                let detached = state.fail(SessionError::Stream(fault));
                Ok(detached
                    .map(|stream| vec![Effect::CloseStream { stream }])
                    .unwrap_or_default())
            } else {
                scout_debug!("Ignoring fault from stream {}: {}", stream, fault);
                Ok(Vec::new())
            }
        }
        Msg::StopClicked => {
            if !state.session().is_live() {
                return reject(state, "stop the scraper");
            }
            state.set_stop_pending(true);
            Ok(Vec::new())
        }
        Msg::StopConfirmed => {
            if !state.stop_pending() || !state.session().is_live() {
                return reject(state, "confirm stop");
            }
            let session_id = state.session_id().unwrap_or_default().to_owned();
            let detached = state.begin_stop();
            scout_info!("Stopping session {}", session_id);
            let mut effects = Vec::with_capacity(2);
            if let Some(stream) = detached {
                effects.push(Effect::CloseStream { stream });
            }
            effects.push(Effect::SubmitStop { session_id });
            Ok(effects)
        }
        Msg::StopCancelled => {
            state.set_stop_pending(false);
            Ok(Vec::new())
        }
        Msg::StopAcknowledged { result } => {
            if state.session() == SessionState::Stopping {
                match result {
                    Ok(()) => {
                        scout_info!("Scraper stopped");
                        state.finish(None);
                    }
                    Err(err) => {
                        scout_warn!("{}; local session closed anyway", err);
                        state.finish(Some(SessionError::Stop(err)));
                    }
                }
            }
            Ok(Vec::new())
        }
        Msg::ErrorAcknowledged => {
            if state.session() != SessionState::Errored {
                return reject(state, "acknowledge an error");
            }
            state.finish(None);
            Ok(Vec::new())
        }
        Msg::Disposed => {
            let detached = state.dispose();
            scout_debug!("Session model disposed");
            Ok(detached
                .map(|stream| vec![Effect::CloseStream { stream }])
                .unwrap_or_default())
        }
    };

    (state, result)
}

fn illegal(state: &SessionModel, operation: &'static str) -> IllegalStateError {
    IllegalStateError {
        operation,
        state: state.session(),
        disposed: state.is_disposed(),
    }
}

fn reject(
    state: SessionModel,
    operation: &'static str,
) -> (SessionModel, Result<Vec<Effect>, CommandError>) {
    let err = illegal(&state, operation);
    (state, Err(err.into()))
}
