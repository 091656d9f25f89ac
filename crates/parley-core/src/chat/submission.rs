use tracing::{debug, warn};

use super::message::{MessageStore, Role};
use super::state::{ChatEffect, SessionPurpose};
use super::task::{TaskId, TaskSeq};
use crate::gateway::UnavailableError;
use crate::identity::SessionId;

/// The single outstanding send.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub task: TaskId,
    /// Session the send was issued under; None while one is being acquired.
    pub session: Option<SessionId>,
    pub text: String,
}

/// Input buffer plus the one-at-a-time send sequencing.
#[derive(Debug, Default)]
pub struct SubmissionController {
    input: String,
    in_flight: Option<InFlight>,
}

impl SubmissionController {
    /// Current contents of the input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Mutable buffer for in-place editing by a front-end.
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// True from submit until the exchange is closed or abandoned.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The outstanding send, if any.
    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    /// Whether `submit` would currently do anything.
    pub fn can_submit(&self) -> bool {
        self.in_flight.is_none() && !self.input.trim().is_empty()
    }

    /// Submits the input buffer.
    ///
    /// The user message is appended before the effect is returned, so it is
    /// always in the list before the network call starts. Blank input and a
    /// second submit while one is outstanding are no-ops.
    pub fn submit(
        &mut self,
        session: Option<&SessionId>,
        messages: &mut MessageStore,
        seq: &mut TaskSeq,
    ) -> Option<ChatEffect> {
        if self.in_flight.is_some() {
            debug!("submit ignored, reply pending");
            return None;
        }
        if self.input.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.input);
        messages.append(Role::User, text.clone());

        let task = seq.next_id();
        self.in_flight = Some(InFlight {
            task,
            session: session.cloned(),
            text: text.clone(),
        });

        Some(match session {
            Some(session) => ChatEffect::SendMessage {
                task,
                session: session.clone(),
                text,
            },
            None => ChatEffect::CreateSession {
                task,
                purpose: SessionPurpose::Send,
            },
        })
    }

    /// Continues a send that had to acquire a session first. Returns the
    /// session to adopt and the send to issue, or None if stale.
    pub fn on_session_for_send(
        &mut self,
        task: TaskId,
        result: Result<SessionId, UnavailableError>,
        messages: &mut MessageStore,
        fallback_reply: &str,
    ) -> Option<(SessionId, ChatEffect)> {
        let in_flight = self.in_flight.as_mut().filter(|f| f.task == task)?;

        match result {
            Ok(session) => {
                in_flight.session = Some(session.clone());
                let effect = ChatEffect::SendMessage {
                    task,
                    session: session.clone(),
                    text: in_flight.text.clone(),
                };
                Some((session, effect))
            }
            Err(err) => {
                warn!(error = %err, "could not acquire session for send");
                self.in_flight = None;
                messages.append(Role::Assistant, fallback_reply);
                None
            }
        }
    }

    /// Applies a reply. Exactly one assistant entry closes each exchange;
    /// results for a superseded task or session are dropped.
    pub fn on_reply(
        &mut self,
        task: TaskId,
        session: &SessionId,
        result: Result<String, UnavailableError>,
        messages: &mut MessageStore,
        fallback_reply: &str,
    ) {
        let matches = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.task == task && f.session.as_ref() == Some(session));
        if !matches {
            debug!(?task, session = %session, "discarding stale reply");
            return;
        }
        self.in_flight = None;

        match result {
            Ok(reply) => {
                messages.append(Role::Assistant, reply);
            }
            Err(err) => {
                warn!(error = %err, details = ?err.details, "send failed, using fallback reply");
                messages.append(Role::Assistant, fallback_reply);
            }
        }
    }

    /// Forgets the outstanding send without closing its exchange. Used when
    /// the conversation it belongs to has been discarded.
    pub fn abandon(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(task = ?in_flight.task, "abandoning in-flight send");
        }
    }
}
