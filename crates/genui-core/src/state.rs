//! Session state machine
//!
//! [`SessionState::apply`] is the whole transition table. The controller in
//! [`crate::session`] owns the value and is the only caller.

use crate::error::GenerationError;
use crate::extract::{extract_detailed, Extraction};

/// Identifies one submission. Later submissions get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    InFlight {
        ticket: Ticket,
    },
    Succeeded {
        code: String,
    },
    Failed {
        reason: GenerationError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Submit { ticket: Ticket },
    ResponseOk { ticket: Ticket, raw: String },
    ResponseErr { ticket: Ticket, error: GenerationError },
    Reset,
}

/// What a transition asks of the outside world
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Invoke the Generation Client for this ticket
    Dispatch(Ticket),
    /// Submit arrived while a request was in flight
    Rejected,
    Completed(Extraction),
    /// User-visible failure notification required
    Failed(GenerationError),
    /// Response for a superseded or cancelled ticket, dropped
    Stale,
    Reset,
}

impl SessionState {
    pub fn apply(self, event: SessionEvent) -> (SessionState, Outcome) {
        match (self, event) {
            (SessionState::InFlight { ticket }, SessionEvent::Submit { .. }) => {
                (SessionState::InFlight { ticket }, Outcome::Rejected)
            }
            (_, SessionEvent::Submit { ticket }) => {
                (SessionState::InFlight { ticket }, Outcome::Dispatch(ticket))
            }

            (SessionState::InFlight { ticket }, SessionEvent::ResponseOk { ticket: t, raw })
                if t == ticket =>
            {
                let extracted = extract_detailed(&raw);
                if extracted.code.is_empty() {
                    let reason = GenerationError::EmptyResponse;
                    (
                        SessionState::Failed { reason: reason.clone() },
                        Outcome::Failed(reason),
                    )
                } else {
                    (
                        SessionState::Succeeded { code: extracted.code },
                        Outcome::Completed(extracted.kind),
                    )
                }
            }
            (SessionState::InFlight { ticket }, SessionEvent::ResponseErr { ticket: t, error })
                if t == ticket =>
            {
                (
                    SessionState::Failed { reason: error.clone() },
                    Outcome::Failed(error),
                )
            }
            (state, SessionEvent::ResponseOk { .. } | SessionEvent::ResponseErr { .. }) => {
                (state, Outcome::Stale)
            }

            (_, SessionEvent::Reset) => (SessionState::Idle, Outcome::Reset),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, SessionState::InFlight { .. })
    }

    /// The code buffer, only present once `Succeeded`
    pub fn code(&self) -> Option<&str> {
        match self {
            SessionState::Succeeded { code } => Some(code),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GenerationError> {
        match self {
            SessionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::InFlight { .. } => "in-flight",
            SessionState::Succeeded { .. } => "succeeded",
            SessionState::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T1: Ticket = Ticket(1);
    const T2: Ticket = Ticket(2);

    fn ok(ticket: Ticket, raw: &str) -> SessionEvent {
        SessionEvent::ResponseOk {
            ticket,
            raw: raw.to_string(),
        }
    }

    #[test]
    fn test_idle_submit_dispatches() {
        let (state, outcome) = SessionState::Idle.apply(SessionEvent::Submit { ticket: T1 });
        assert_eq!(state, SessionState::InFlight { ticket: T1 });
        assert_eq!(outcome, Outcome::Dispatch(T1));
    }

    #[test]
    fn test_submit_while_in_flight_is_rejected() {
        let (state, outcome) =
            SessionState::InFlight { ticket: T1 }.apply(SessionEvent::Submit { ticket: T2 });
        assert_eq!(state, SessionState::InFlight { ticket: T1 });
        assert_eq!(outcome, Outcome::Rejected);
    }

    #[test]
    fn test_response_extracts_code() {
        let (state, outcome) = SessionState::InFlight { ticket: T1 }
            .apply(ok(T1, "Here is the code:\n```html\n<div>Card</div>\n```\nEnjoy!"));
        assert_eq!(
            state,
            SessionState::Succeeded {
                code: "<div>Card</div>".to_string()
            }
        );
        assert_eq!(outcome, Outcome::Completed(Extraction::Fenced));
    }

    #[test]
    fn test_blank_extraction_fails_as_empty() {
        let (state, outcome) =
            SessionState::InFlight { ticket: T1 }.apply(ok(T1, "```html\n\n```"));
        assert_eq!(
            state,
            SessionState::Failed {
                reason: GenerationError::EmptyResponse
            }
        );
        assert_eq!(outcome, Outcome::Failed(GenerationError::EmptyResponse));
    }

    #[test]
    fn test_error_response_fails() {
        let error = GenerationError::NetworkFailure("timed out".into());
        let (state, outcome) = SessionState::InFlight { ticket: T1 }.apply(
            SessionEvent::ResponseErr {
                ticket: T1,
                error: error.clone(),
            },
        );
        assert_eq!(state.error(), Some(&error));
        assert_eq!(outcome, Outcome::Failed(error));
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let (state, outcome) = SessionState::InFlight { ticket: T2 }.apply(ok(T1, "<p>old</p>"));
        assert_eq!(state, SessionState::InFlight { ticket: T2 });
        assert_eq!(outcome, Outcome::Stale);

        let done = SessionState::Succeeded {
            code: "<p>new</p>".into(),
        };
        let (state, outcome) = done.clone().apply(ok(T1, "<p>old</p>"));
        assert_eq!(state, done);
        assert_eq!(outcome, Outcome::Stale);
    }

    #[test]
    fn test_resubmit_after_terminal_states() {
        let failed = SessionState::Failed {
            reason: GenerationError::EmptyResponse,
        };
        let (state, _) = failed.apply(SessionEvent::Submit { ticket: T2 });
        assert!(state.is_in_flight());

        let done = SessionState::Succeeded { code: "<p>x</p>".into() };
        let (state, outcome) = done.apply(SessionEvent::Submit { ticket: T2 });
        assert_eq!(state.code(), None);
        assert_eq!(outcome, Outcome::Dispatch(T2));
    }

    #[test]
    fn test_reset_from_any_state() {
        for state in [
            SessionState::Idle,
            SessionState::InFlight { ticket: T1 },
            SessionState::Succeeded { code: "<p>x</p>".into() },
            SessionState::Failed {
                reason: GenerationError::EmptyResponse,
            },
        ] {
            assert_eq!(state.apply(SessionEvent::Reset), (SessionState::Idle, Outcome::Reset));
        }
    }
}
