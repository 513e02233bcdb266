use jobscout_core::{JobRecord, SessionSnapshot, SessionState};

use super::render;

/// Turns successive snapshots into the lines worth printing: state changes,
/// newly arrived jobs and new errors.
#[derive(Debug, Default)]
pub struct Reporter {
    state: SessionState,
    newest: Option<JobRecord>,
    error: Option<String>,
    stop_pending: bool,
}

impl Reporter {
    pub fn report(&mut self, snapshot: &SessionSnapshot) -> Vec<String> {
        let mut lines = Vec::new();

        if snapshot.state != self.state {
            match snapshot.state {
                SessionState::Streaming => {
                    lines.push("Scraper started. Listening for real-time jobs...".to_string())
                }
                SessionState::Stopping => lines.push("Stopping scraper...".to_string()),
                SessionState::Idle if self.state == SessionState::Stopping => {
                    if snapshot.last_error.is_none() {
                        lines.push("Scraper stopped successfully.".to_string());
                    }
                }
                _ => {}
            }
            self.state = snapshot.state;
        }

        if snapshot.stop_pending != self.stop_pending {
            if !snapshot.stop_pending && snapshot.state.is_live() {
                lines.push("Continuing to scrape.".to_string());
            }
            self.stop_pending = snapshot.stop_pending;
        }

        let newest = snapshot.records.first();
        if newest.is_some() && newest != self.newest.as_ref() {
            if let Some(record) = newest {
                lines.push(format!(
                    "[{}] {}",
                    snapshot.record_count(),
                    render::record_line(record)
                ));
            }
            self.newest = newest.cloned();
        }

        let error = snapshot.last_error_message();
        if error.is_some() && error != self.error {
            if let Some(message) = &error {
                lines.push(format!("Error: {message}"));
            }
        }
        self.error = error;

        lines
    }
}
