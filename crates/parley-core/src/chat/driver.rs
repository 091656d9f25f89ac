use std::collections::VecDeque;
use std::sync::Arc;

use super::effects;
use super::state::{ChatEvent, ChatState};
use super::update::update;
use crate::gateway::BackendGateway;

/// Runs the reducer without a UI, awaiting each effect in order.
///
/// Every dispatch settles completely: all effects it causes, and all effects
/// those completions cause, finish before it returns.
pub struct Driver {
    state: ChatState,
    gateway: Arc<dyn BackendGateway>,
}

impl Driver {
    pub fn new(state: ChatState, gateway: Arc<dyn BackendGateway>) -> Self {
        Self { state, gateway }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn into_state(self) -> ChatState {
        self.state
    }

    pub async fn dispatch(&mut self, event: ChatEvent) {
        let mut pending: VecDeque<_> = update(&mut self.state, event).into();
        while let Some(effect) = pending.pop_front() {
            let completion = effects::execute(self.gateway.as_ref(), effect).await;
            pending.extend(update(&mut self.state, completion));
        }
    }

    /// Activates the session and waits for it to become ready.
    pub async fn activate(&mut self) {
        self.dispatch(ChatEvent::Activate).await;
    }

    /// Submits `text` as if typed, waiting for the reply.
    pub async fn submit(&mut self, text: &str) {
        self.dispatch(ChatEvent::SetInput(text.to_string())).await;
        self.dispatch(ChatEvent::Submit).await;
    }
}
