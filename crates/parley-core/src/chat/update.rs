//! The chat reducer.
//!
//! `update` is the only place conversation state changes. It never touches
//! the network: round trips are returned as [`ChatEffect`]s and come back
//! later as completion events.

use tracing::debug;

use super::state::{ChatEffect, ChatEvent, ChatState, SessionPurpose};
use super::task::TaskId;
use crate::gateway::UnavailableError;
use crate::identity::SessionId;

pub fn update(state: &mut ChatState, event: ChatEvent) -> Vec<ChatEffect> {
    match event {
        ChatEvent::Activate => state.session.activate(&mut state.seq).into_iter().collect(),
        ChatEvent::SetInput(text) => {
            state.submission.set_input(text);
            vec![]
        }
        ChatEvent::Submit => {
            if !state.session.is_ready() {
                debug!("submit ignored, session not ready");
                return vec![];
            }
            state
                .submission
                .submit(
                    state.session.current(),
                    &mut state.messages,
                    &mut state.seq,
                )
                .into_iter()
                .collect()
        }
        // Prompt shortcuts go through the one submit path.
        ChatEvent::SubmitPrompt(text) => {
            state.submission.set_input(text);
            update(state, ChatEvent::Submit)
        }
        ChatEvent::NewSession => state
            .session
            .start_new_session(&mut state.seq)
            .into_iter()
            .collect(),
        ChatEvent::DismissNotice => {
            state.notice = None;
            vec![]
        }
        ChatEvent::Tick(now) => {
            if state
                .notice
                .as_ref()
                .is_some_and(|n| n.is_expired(now, state.settings.notice_timeout))
            {
                state.notice = None;
            }
            vec![]
        }
        ChatEvent::SessionCreated {
            task,
            purpose,
            result,
        } => handle_session_created(state, task, purpose, result),
        ChatEvent::HistoryLoaded {
            task,
            session,
            result,
        } => {
            state
                .session
                .on_history_loaded(task, &session, result, &mut state.messages);
            vec![]
        }
        ChatEvent::ReplyReceived {
            task,
            session,
            result,
        } => {
            state.submission.on_reply(
                task,
                &session,
                result,
                &mut state.messages,
                &state.settings.fallback_reply,
            );
            vec![]
        }
    }
}

fn handle_session_created(
    state: &mut ChatState,
    task: TaskId,
    purpose: SessionPurpose,
    result: Result<SessionId, UnavailableError>,
) -> Vec<ChatEffect> {
    match purpose {
        SessionPurpose::Activate => {
            state
                .session
                .on_activation_created(task, result, &mut state.messages);
            vec![]
        }
        SessionPurpose::Reset => {
            state.session.on_reset_created(
                task,
                result,
                &mut state.messages,
                &mut state.submission,
                &mut state.notice,
            );
            vec![]
        }
        SessionPurpose::Send => {
            match state.submission.on_session_for_send(
                task,
                result,
                &mut state.messages,
                &state.settings.fallback_reply,
            ) {
                Some((session, effect)) => {
                    state.session.adopt(session);
                    vec![effect]
                }
                None => vec![],
            }
        }
    }
}
