use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::*;
use crate::gateway::{BackendGateway, GatewayFuture, UnavailableError, UnavailableKind};
use crate::identity::{IdentityStore, MemoryIdentityStore, SessionId};

const FALLBACK: &str = "I'm sorry, I don't understand that.";

#[derive(Default)]
struct Script {
    sessions: VecDeque<Result<SessionId, UnavailableError>>,
    history: VecDeque<Result<Vec<Message>, UnavailableError>>,
    replies: VecDeque<Result<String, UnavailableError>>,
    new_session_calls: usize,
    history_calls: usize,
    sent: Vec<(SessionId, String)>,
}

/// Gateway answering from queued results. An empty queue answers with an
/// error so unexpected calls show up as failures.
#[derive(Clone, Default)]
struct ScriptedGateway {
    script: Arc<Mutex<Script>>,
}

impl ScriptedGateway {
    fn session(self, id: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .sessions
            .push_back(Ok(SessionId::new(id)));
        self
    }

    fn session_error(self) -> Self {
        self.script.lock().unwrap().sessions.push_back(Err(down()));
        self
    }

    fn history(self, messages: &[(Role, &str)]) -> Self {
        let list = messages
            .iter()
            .enumerate()
            .map(|(i, (role, text))| Message::new(i, *role, *text))
            .collect();
        self.script.lock().unwrap().history.push_back(Ok(list));
        self
    }

    fn history_error(self) -> Self {
        self.script.lock().unwrap().history.push_back(Err(down()));
        self
    }

    fn reply(self, text: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .replies
            .push_back(Ok(text.to_string()));
        self
    }

    fn reply_error(self) -> Self {
        self.script.lock().unwrap().replies.push_back(Err(down()));
        self
    }

    fn new_session_calls(&self) -> usize {
        self.script.lock().unwrap().new_session_calls
    }

    fn history_calls(&self) -> usize {
        self.script.lock().unwrap().history_calls
    }

    fn sent(&self) -> Vec<(SessionId, String)> {
        self.script.lock().unwrap().sent.clone()
    }
}

fn down() -> UnavailableError {
    UnavailableError::new(UnavailableKind::Network, "Backend unreachable")
}

impl BackendGateway for ScriptedGateway {
    fn new_session(&self) -> GatewayFuture<'_, SessionId> {
        let mut script = self.script.lock().unwrap();
        script.new_session_calls += 1;
        let result = script.sessions.pop_front().unwrap_or_else(|| Err(down()));
        Box::pin(async move { result })
    }

    fn fetch_history<'a>(&'a self, _session: &'a SessionId) -> GatewayFuture<'a, Vec<Message>> {
        let mut script = self.script.lock().unwrap();
        script.history_calls += 1;
        let result = script.history.pop_front().unwrap_or_else(|| Err(down()));
        Box::pin(async move { result })
    }

    fn send_message<'a>(
        &'a self,
        session: &'a SessionId,
        text: &'a str,
    ) -> GatewayFuture<'a, String> {
        let mut script = self.script.lock().unwrap();
        script.sent.push((session.clone(), text.to_string()));
        let result = script.replies.pop_front().unwrap_or_else(|| Err(down()));
        Box::pin(async move { result })
    }
}

fn state_with(identity: &MemoryIdentityStore) -> ChatState {
    ChatState::new(Box::new(identity.clone()), ChatSettings::default())
}

fn driver(identity: &MemoryIdentityStore, gateway: &ScriptedGateway) -> Driver {
    Driver::new(state_with(identity), Arc::new(gateway.clone()))
}

fn contents(state: &ChatState) -> Vec<(Role, String)> {
    state
        .messages
        .snapshot()
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect()
}

/// Reducer already activated on `session`, with no effects outstanding.
fn ready_state(session: &str) -> ChatState {
    let identity = MemoryIdentityStore::with_session(session);
    let mut state = state_with(&identity);
    let effects = update(&mut state, ChatEvent::Activate);
    let [ChatEffect::FetchHistory { task, session }] = effects.as_slice() else {
        panic!("expected history fetch, got {effects:?}");
    };
    update(
        &mut state,
        ChatEvent::HistoryLoaded {
            task: *task,
            session: session.clone(),
            result: Ok(Vec::new()),
        },
    );
    assert!(state.session.is_ready());
    state
}

fn submit(state: &mut ChatState, text: &str) -> Vec<ChatEffect> {
    update(state, ChatEvent::SetInput(text.to_string()));
    update(state, ChatEvent::Submit)
}

#[tokio::test]
async fn test_fresh_start_creates_session_once_and_skips_history() {
    let identity = MemoryIdentityStore::default();
    let gateway = ScriptedGateway::default().session("s-new");
    let mut driver = driver(&identity, &gateway);

    driver.activate().await;
    driver.activate().await;

    assert_eq!(gateway.new_session_calls(), 1);
    assert_eq!(gateway.history_calls(), 0);
    assert_eq!(identity.get(), Some(SessionId::new("s-new")));
    assert!(driver.state().messages.is_empty());
    assert!(driver.state().session.is_ready());
}

#[test]
fn test_activation_guard_set_before_any_effect_runs() {
    let identity = MemoryIdentityStore::default();
    let mut state = state_with(&identity);

    let first = update(&mut state, ChatEvent::Activate);
    let second = update(&mut state, ChatEvent::Activate);

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert_eq!(state.session.phase(), SessionPhase::Activating);
}

#[tokio::test]
async fn test_resume_hydrates_then_appends_after_history() {
    let identity = MemoryIdentityStore::with_session("s-1");
    let gateway = ScriptedGateway::default()
        .history(&[
            (Role::User, "one"),
            (Role::Assistant, "two"),
            (Role::User, "three"),
        ])
        .reply("four");
    let mut driver = driver(&identity, &gateway);

    driver.activate().await;
    driver.submit("question").await;

    assert_eq!(gateway.new_session_calls(), 0);
    assert_eq!(
        contents(driver.state()),
        vec![
            (Role::User, "one".to_string()),
            (Role::Assistant, "two".to_string()),
            (Role::User, "three".to_string()),
            (Role::User, "question".to_string()),
            (Role::Assistant, "four".to_string()),
        ]
    );
    let ids: Vec<usize> = driver.state().messages.snapshot().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_history_replaces_instead_of_appending() {
    let identity = MemoryIdentityStore::with_session("s-1");
    let gateway = ScriptedGateway::default().history(&[(Role::User, "kept")]);
    let mut state = state_with(&identity);
    state.messages.append(Role::Assistant, "leftover");

    let mut driver = Driver::new(state, Arc::new(gateway));
    driver.activate().await;

    assert_eq!(
        contents(driver.state()),
        vec![(Role::User, "kept".to_string())]
    );
}

#[tokio::test]
async fn test_successful_submits_add_two_entries_each() {
    let identity = MemoryIdentityStore::with_session("s-1");
    let gateway = ScriptedGateway::default()
        .history(&[])
        .reply("a1")
        .reply("a2")
        .reply("a3");
    let mut driver = driver(&identity, &gateway);
    driver.activate().await;

    for (i, text) in ["q1", "q2", "q3"].into_iter().enumerate() {
        driver.submit(text).await;
        assert_eq!(driver.state().messages.len(), (i + 1) * 2);
        assert!(!driver.state().is_replying());
    }

    let roles: Vec<Role> = driver.state().messages.snapshot().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
        ]
    );
    assert_eq!(
        gateway.sent(),
        vec![
            (SessionId::new("s-1"), "q1".to_string()),
            (SessionId::new("s-1"), "q2".to_string()),
            (SessionId::new("s-1"), "q3".to_string()),
        ]
    );
}

#[test]
fn test_blank_submit_is_noop() {
    let mut state = ready_state("s-1");
    let revision = state.messages.revision();

    assert!(submit(&mut state, "").is_empty());
    assert!(submit(&mut state, "   ").is_empty());

    assert_eq!(state.messages.revision(), revision);
    assert!(state.messages.is_empty());
    assert!(!state.is_replying());
}

#[test]
fn test_submit_appends_user_entry_before_send_effect() {
    let mut state = ready_state("s-1");

    let effects = submit(&mut state, "hello");

    assert_eq!(
        contents(&state),
        vec![(Role::User, "hello".to_string())]
    );
    assert!(state.is_replying());
    assert!(state.submission.input().is_empty());
    assert!(matches!(
        effects.as_slice(),
        [ChatEffect::SendMessage { text, .. }] if text == "hello"
    ));
}

#[test]
fn test_second_submit_rejected_while_in_flight() {
    let mut state = ready_state("s-1");
    submit(&mut state, "first");

    let effects = submit(&mut state, "second");
    let prompt_effects = update(&mut state, ChatEvent::SubmitPrompt("third".into()));

    assert!(effects.is_empty());
    assert!(prompt_effects.is_empty());
    assert_eq!(state.messages.len(), 1);
}

#[test]
fn test_submit_before_ready_is_noop() {
    let identity = MemoryIdentityStore::with_session("s-1");
    let mut state = state_with(&identity);
    update(&mut state, ChatEvent::Activate);

    assert!(submit(&mut state, "too early").is_empty());
    assert!(state.messages.is_empty());
}

#[test]
fn test_submit_prompt_matches_manual_submit() {
    let mut manual = ready_state("s-1");
    let mut shortcut = ready_state("s-1");

    let manual_effects = submit(&mut manual, "Who are the characters?");
    let shortcut_effects = update(
        &mut shortcut,
        ChatEvent::SubmitPrompt("Who are the characters?".into()),
    );

    assert_eq!(manual.messages.snapshot(), shortcut.messages.snapshot());
    assert_eq!(manual_effects, shortcut_effects);
    assert_eq!(manual.is_replying(), shortcut.is_replying());
}

#[tokio::test]
async fn test_send_failure_appends_fallback_and_clears_in_flight() {
    let identity = MemoryIdentityStore::with_session("s-1");
    let gateway = ScriptedGateway::default().history(&[]).reply_error();
    let mut driver = driver(&identity, &gateway);
    driver.activate().await;

    driver.submit("hello").await;

    let last = driver.state().messages.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, FALLBACK);
    assert!(!driver.state().is_replying());
    assert!(driver.state().notice.is_none());
}

#[tokio::test]
async fn test_activation_failures_start_empty_and_ready() {
    let fresh = MemoryIdentityStore::default();
    let mut driver_a = driver(&fresh, &ScriptedGateway::default().session_error());
    driver_a.activate().await;
    assert!(driver_a.state().session.is_ready());
    assert!(driver_a.state().messages.is_empty());
    assert!(fresh.get().is_none());

    let stored = MemoryIdentityStore::with_session("s-1");
    let mut driver_b = driver(&stored, &ScriptedGateway::default().history_error());
    driver_b.activate().await;
    assert!(driver_b.state().session.is_ready());
    assert!(driver_b.state().messages.is_empty());
    assert_eq!(
        driver_b.state().session.current(),
        Some(&SessionId::new("s-1"))
    );
}

#[tokio::test]
async fn test_submit_without_session_acquires_one_first() {
    let identity = MemoryIdentityStore::default();
    let gateway = ScriptedGateway::default()
        .session_error()
        .session("s-late")
        .reply("hi there");
    let mut driver = driver(&identity, &gateway);
    driver.activate().await;

    driver.submit("hello").await;

    assert_eq!(gateway.sent(), vec![(SessionId::new("s-late"), "hello".to_string())]);
    assert_eq!(identity.get(), Some(SessionId::new("s-late")));
    assert_eq!(
        contents(driver.state()),
        vec![
            (Role::User, "hello".to_string()),
            (Role::Assistant, "hi there".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_new_session_clears_conversation_and_replaces_identity() {
    let identity = MemoryIdentityStore::with_session("s-1");
    let gateway = ScriptedGateway::default()
        .history(&[(Role::User, "old"), (Role::Assistant, "reply")])
        .session("s-2");
    let mut driver = driver(&identity, &gateway);
    driver.activate().await;

    driver.dispatch(ChatEvent::NewSession).await;

    assert!(driver.state().messages.is_empty());
    assert_eq!(identity.get(), Some(SessionId::new("s-2")));
    assert_eq!(
        driver.state().session.current(),
        Some(&SessionId::new("s-2"))
    );
}

#[tokio::test]
async fn test_failed_new_session_keeps_state_and_raises_notice() {
    let identity = MemoryIdentityStore::with_session("s-1");
    let gateway = ScriptedGateway::default()
        .history(&[(Role::User, "old"), (Role::Assistant, "reply")])
        .session_error();
    let mut driver = driver(&identity, &gateway);
    driver.activate().await;

    driver.dispatch(ChatEvent::NewSession).await;

    assert_eq!(driver.state().messages.len(), 2);
    assert_eq!(identity.get(), Some(SessionId::new("s-1")));
    let notice = driver.state().notice.as_ref().unwrap();
    assert!(notice.message.contains("Could not start a new session"));

    driver.dispatch(ChatEvent::DismissNotice).await;
    assert!(driver.state().notice.is_none());
}

#[test]
fn test_new_session_while_reset_pending_is_ignored() {
    let mut state = ready_state("s-1");

    let first = update(&mut state, ChatEvent::NewSession);
    let second = update(&mut state, ChatEvent::NewSession);

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
    assert!(state.session.is_resetting());
}

#[test]
fn test_reset_during_send_discards_late_reply() {
    let mut state = ready_state("s-1");
    let send = submit(&mut state, "will be orphaned");
    let [ChatEffect::SendMessage { task: send_task, session: send_session, .. }] = send.as_slice()
    else {
        panic!("expected send, got {send:?}");
    };

    let reset = update(&mut state, ChatEvent::NewSession);
    let [ChatEffect::CreateSession { task: reset_task, purpose }] = reset.as_slice() else {
        panic!("expected create session, got {reset:?}");
    };
    assert_eq!(*purpose, SessionPurpose::Reset);

    update(
        &mut state,
        ChatEvent::SessionCreated {
            task: *reset_task,
            purpose: SessionPurpose::Reset,
            result: Ok(SessionId::new("s-2")),
        },
    );
    assert!(state.messages.is_empty());
    assert!(!state.is_replying());

    for result in [Ok("late reply".to_string()), Err(down())] {
        update(
            &mut state,
            ChatEvent::ReplyReceived {
                task: *send_task,
                session: send_session.clone(),
                result,
            },
        );
    }

    assert!(state.messages.is_empty());
    assert!(!state.is_replying());
}

#[test]
fn test_reset_during_session_lookup_drops_late_session() {
    let identity = MemoryIdentityStore::default();
    let mut state = state_with(&identity);
    let effects = update(&mut state, ChatEvent::Activate);
    let [ChatEffect::CreateSession { task, .. }] = effects.as_slice() else {
        panic!("expected create session, got {effects:?}");
    };
    update(
        &mut state,
        ChatEvent::SessionCreated {
            task: *task,
            purpose: SessionPurpose::Activate,
            result: Err(down()),
        },
    );
    assert!(state.session.current().is_none());

    let lookup = submit(&mut state, "hello");
    let [ChatEffect::CreateSession { task: lookup_task, purpose: SessionPurpose::Send }] =
        lookup.as_slice()
    else {
        panic!("expected session lookup for send, got {lookup:?}");
    };

    let reset = update(&mut state, ChatEvent::NewSession);
    let [ChatEffect::CreateSession { task: reset_task, .. }] = reset.as_slice() else {
        panic!("expected create session, got {reset:?}");
    };
    update(
        &mut state,
        ChatEvent::SessionCreated {
            task: *reset_task,
            purpose: SessionPurpose::Reset,
            result: Ok(SessionId::new("s-reset")),
        },
    );

    let late = update(
        &mut state,
        ChatEvent::SessionCreated {
            task: *lookup_task,
            purpose: SessionPurpose::Send,
            result: Ok(SessionId::new("s-late")),
        },
    );

    assert!(late.is_empty());
    assert_eq!(state.session.current(), Some(&SessionId::new("s-reset")));
    assert_eq!(identity.get(), Some(SessionId::new("s-reset")));
    assert!(state.messages.is_empty());
    assert!(!state.is_replying());
}

#[test]
fn test_notice_expires_on_tick() {
    let mut state = ready_state("s-1");
    let reset = update(&mut state, ChatEvent::NewSession);
    let [ChatEffect::CreateSession { task, .. }] = reset.as_slice() else {
        panic!("expected create session, got {reset:?}");
    };
    update(
        &mut state,
        ChatEvent::SessionCreated {
            task: *task,
            purpose: SessionPurpose::Reset,
            result: Err(down()),
        },
    );
    let raised_at = state.notice.as_ref().unwrap().raised_at;

    update(&mut state, ChatEvent::Tick(raised_at + Duration::from_secs(1)));
    assert!(state.notice.is_some());

    update(&mut state, ChatEvent::Tick(raised_at + Duration::from_secs(5)));
    assert!(state.notice.is_none());
}

#[test]
fn test_notice_without_timeout_stays_until_dismissed() {
    let notice = Notice::new("boom");
    assert!(!notice.is_expired(Instant::now() + Duration::from_secs(3600), None));
}
