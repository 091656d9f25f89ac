use std::time::{Duration, Instant};

use super::message::{Message, MessageStore};
use super::session::SessionController;
use super::submission::SubmissionController;
use super::task::{TaskId, TaskSeq};
use crate::config::Config;
use crate::gateway::UnavailableError;
use crate::identity::{IdentityStore, SessionId};

/// Why a new session is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPurpose {
    /// First activation found no stored identifier
    Activate,
    /// User asked to start over
    Reset,
    /// A submit arrived while no session was held
    Send,
}

/// Inputs to the reducer: user intents and completed round trips.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Activate,
    SetInput(String),
    Submit,
    SubmitPrompt(String),
    NewSession,
    DismissNotice,
    Tick(Instant),
    SessionCreated {
        task: TaskId,
        purpose: SessionPurpose,
        result: Result<SessionId, UnavailableError>,
    },
    HistoryLoaded {
        task: TaskId,
        session: SessionId,
        result: Result<Vec<Message>, UnavailableError>,
    },
    ReplyReceived {
        task: TaskId,
        session: SessionId,
        result: Result<String, UnavailableError>,
    },
}

/// Network work requested by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEffect {
    CreateSession {
        task: TaskId,
        purpose: SessionPurpose,
    },
    FetchHistory {
        task: TaskId,
        session: SessionId,
    },
    SendMessage {
        task: TaskId,
        session: SessionId,
        text: String,
    },
}

/// User-facing failure notice, dismissable and optionally self-expiring.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub raised_at: Instant,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raised_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant, timeout: Option<Duration>) -> bool {
        timeout.is_some_and(|timeout| now.saturating_duration_since(self.raised_at) >= timeout)
    }
}

/// Behavior knobs for the reducer, usually taken from [`Config`].
#[derive(Debug, Clone)]
pub struct ChatSettings {
    /// Assistant content appended when a send fails.
    pub fallback_reply: String,
    /// How long a notice stays before `Tick` clears it. None keeps it until
    /// dismissed.
    pub notice_timeout: Option<Duration>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            fallback_reply: Config::DEFAULT_FALLBACK_REPLY.to_string(),
            notice_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl From<&Config> for ChatSettings {
    fn from(config: &Config) -> Self {
        Self {
            fallback_reply: config.fallback_reply.clone(),
            notice_timeout: config.notice_timeout(),
        }
    }
}

/// Whole conversation state. Mutated only by [`super::update`].
pub struct ChatState {
    pub session: SessionController,
    pub messages: MessageStore,
    pub submission: SubmissionController,
    pub notice: Option<Notice>,
    pub settings: ChatSettings,
    pub(crate) seq: TaskSeq,
}

impl ChatState {
    pub fn new(identity: Box<dyn IdentityStore>, settings: ChatSettings) -> Self {
        Self {
            session: SessionController::new(identity),
            messages: MessageStore::new(),
            submission: SubmissionController::default(),
            notice: None,
            settings,
            seq: TaskSeq::default(),
        }
    }

    /// True while a send is outstanding.
    pub fn is_replying(&self) -> bool {
        self.submission.is_in_flight()
    }
}
