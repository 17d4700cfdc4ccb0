//! Session controller: one request/response cycle at a time
//!
//! Submissions run on the tokio runtime; their results come back as
//! [`SessionEvent`]s and go through the same transition table as everything
//! else. A request superseded by `reset` + `submit` is not cancelled. Its
//! response is dropped when it arrives because its ticket no longer matches.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::ai::GenerationClient;
use crate::error::{GenerationError, SessionError};
use crate::extract::Extraction;
use crate::request::GenerationRequest;
use crate::state::{Outcome, SessionEvent, SessionState, Ticket};

struct Pending {
    ticket: Ticket,
    handle: JoinHandle<Result<String, GenerationError>>,
}

pub struct SessionController {
    client: Arc<dyn GenerationClient>,
    state: SessionState,
    last_ticket: u64,
    pending: Vec<Pending>,
}

impl SessionController {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            state: SessionState::Idle,
            last_ticket: 0,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn client(&self) -> &dyn GenerationClient {
        self.client.as_ref()
    }

    /// Swap the Generation Client. Takes effect on the next submit.
    pub fn set_client(&mut self, client: Arc<dyn GenerationClient>) {
        self.client = client;
    }

    /// Start a generation. Must be called from within a tokio runtime.
    pub fn submit(&mut self, request: GenerationRequest) -> Result<Ticket, SessionError> {
        let ticket = Ticket(self.last_ticket + 1);

        match self.handle_event(SessionEvent::Submit { ticket }) {
            Outcome::Dispatch(ticket) => {
                self.last_ticket = ticket.0;
                tracing::info!(
                    ticket = ticket.0,
                    client = %self.client.describe(),
                    framework = request.framework().as_str(),
                    "dispatching generation"
                );

                let client = Arc::clone(&self.client);
                let handle = tokio::spawn(async move { client.generate(&request).await });
                self.pending.push(Pending { ticket, handle });
                Ok(ticket)
            }
            _ => Err(SessionError::Busy),
        }
    }

    pub fn reset(&mut self) -> Outcome {
        self.handle_event(SessionEvent::Reset)
    }

    /// Feed one event through the transition table.
    pub fn handle_event(&mut self, event: SessionEvent) -> Outcome {
        let state = std::mem::take(&mut self.state);
        let (next, outcome) = state.apply(event);
        self.state = next;

        match &outcome {
            Outcome::Dispatch(_) | Outcome::Reset => {
                tracing::debug!(state = self.state.label(), "session transition");
            }
            Outcome::Rejected => {
                tracing::warn!("submit rejected: a generation is already in flight");
            }
            Outcome::Completed(Extraction::Unterminated) => {
                tracing::warn!("response had an unterminated code fence; kept the whole text as code");
            }
            Outcome::Completed(kind) => {
                tracing::info!(extraction = ?kind, "generation succeeded");
            }
            Outcome::Failed(reason) => {
                tracing::warn!(kind = reason.kind(), error = %reason, "generation failed");
            }
            Outcome::Stale => {
                tracing::debug!("dropped response for a superseded request");
            }
        }

        outcome
    }

    /// Harvest finished requests without waiting on unfinished ones.
    pub async fn poll(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].handle.is_finished() {
                let pending = self.pending.remove(i);
                outcomes.push(self.complete(pending).await);
            } else {
                i += 1;
            }
        }
        outcomes
    }

    /// Wait for every outstanding request. Returns the outcome of the one
    /// that was still current, if any.
    pub async fn wait(&mut self) -> Option<Outcome> {
        let mut current = None;
        while !self.pending.is_empty() {
            let pending = self.pending.remove(0);
            let outcome = self.complete(pending).await;
            if outcome != Outcome::Stale {
                current = Some(outcome);
            }
        }
        current
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    async fn complete(&mut self, pending: Pending) -> Outcome {
        let ticket = pending.ticket;
        let result = match pending.handle.await {
            Ok(result) => result,
            Err(e) => Err(GenerationError::NetworkFailure(format!(
                "generation task ended unexpectedly: {}",
                e
            ))),
        };

        let event = match result {
            Ok(raw) => SessionEvent::ResponseOk { ticket, raw },
            Err(error) => SessionEvent::ResponseErr { ticket, error },
        };
        self.handle_event(event)
    }
}
