use tracing::{debug, info, warn};

use super::message::{Message, MessageStore};
use super::state::{ChatEffect, Notice, SessionPurpose};
use super::submission::SubmissionController;
use super::task::{TaskId, TaskSeq, TaskState};
use crate::gateway::UnavailableError;
use crate::identity::{IdentityStore, SessionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    /// Activation was requested and is waiting on the backend.
    Activating,
    Ready,
}

/// Owns session identity: acquiring or resuming it once, and replacing it on
/// an explicit reset.
pub struct SessionController {
    identity: Box<dyn IdentityStore>,
    phase: SessionPhase,
    current: Option<SessionId>,
    activation: TaskState,
    reset: TaskState,
}

impl SessionController {
    pub fn new(identity: Box<dyn IdentityStore>) -> Self {
        Self {
            identity,
            phase: SessionPhase::Uninitialized,
            current: None,
            activation: TaskState::default(),
            reset: TaskState::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    pub fn current(&self) -> Option<&SessionId> {
        self.current.as_ref()
    }

    pub fn is_resetting(&self) -> bool {
        self.reset.is_running()
    }

    /// Starts activation. Only the first call does anything; the phase leaves
    /// `Uninitialized` before the effect is handed out.
    pub fn activate(&mut self, seq: &mut TaskSeq) -> Option<ChatEffect> {
        if self.phase != SessionPhase::Uninitialized {
            return None;
        }
        self.phase = SessionPhase::Activating;
        let task = self.activation.start(seq);

        match self.identity.get() {
            Some(session) => {
                info!(session = %session, "resuming stored session");
                self.current = Some(session.clone());
                Some(ChatEffect::FetchHistory { task, session })
            }
            None => {
                info!("no stored session, requesting a new one");
                Some(ChatEffect::CreateSession {
                    task,
                    purpose: SessionPurpose::Activate,
                })
            }
        }
    }

    /// Requests a replacement session. Ignored before activation finishes or
    /// while another reset is outstanding.
    pub fn start_new_session(&mut self, seq: &mut TaskSeq) -> Option<ChatEffect> {
        if !self.is_ready() || self.reset.is_running() {
            debug!(phase = ?self.phase, "new session request ignored");
            return None;
        }
        let task = self.reset.start(seq);
        Some(ChatEffect::CreateSession {
            task,
            purpose: SessionPurpose::Reset,
        })
    }

    pub fn on_activation_created(
        &mut self,
        task: TaskId,
        result: Result<SessionId, UnavailableError>,
        messages: &mut MessageStore,
    ) {
        if !self.activation.finish_if_active(task) {
            debug!(?task, "discarding stale activation result");
            return;
        }

        match result {
            Ok(session) => {
                self.adopt(session);
            }
            Err(err) => {
                warn!(error = %err, details = ?err.details, "could not create session, starting empty");
            }
        }
        messages.clear();
        self.phase = SessionPhase::Ready;
    }

    pub fn on_history_loaded(
        &mut self,
        task: TaskId,
        session: &SessionId,
        result: Result<Vec<Message>, UnavailableError>,
        messages: &mut MessageStore,
    ) {
        if !self.activation.finish_if_active(task) || self.current.as_ref() != Some(session) {
            debug!(?task, "discarding stale history");
            return;
        }

        match result {
            Ok(history) => {
                info!(count = history.len(), "history loaded");
                messages.replace_all(history);
            }
            Err(err) => {
                warn!(error = %err, details = ?err.details, "could not load history, starting empty");
                messages.clear();
            }
        }
        self.phase = SessionPhase::Ready;
    }

    /// Applies a reset result. Success swaps identity and empties the
    /// conversation; failure leaves everything as it was and raises a notice.
    pub fn on_reset_created(
        &mut self,
        task: TaskId,
        result: Result<SessionId, UnavailableError>,
        messages: &mut MessageStore,
        submission: &mut SubmissionController,
        notice: &mut Option<Notice>,
    ) {
        if !self.reset.finish_if_active(task) {
            debug!(?task, "discarding stale reset result");
            return;
        }

        match result {
            Ok(session) => {
                self.adopt(session);
                submission.abandon();
                messages.clear();
                *notice = None;
            }
            Err(err) => {
                warn!(error = %err, details = ?err.details, "could not start a new session");
                *notice = Some(Notice::new(format!("Could not start a new session: {err}")));
            }
        }
    }

    /// Makes `session` current and persists it. A storage failure only costs
    /// resumption on the next run.
    pub(crate) fn adopt(&mut self, session: SessionId) {
        info!(session = %session, "session acquired");
        if let Err(err) = self.identity.set(&session) {
            warn!(error = %format!("{err:#}"), "could not persist session id");
        }
        self.current = Some(session);
    }
}
