use super::state::{ChatEffect, ChatEvent};
use crate::gateway::BackendGateway;

/// Performs one effect against the backend and reports the outcome as the
/// event the reducer expects back.
pub async fn execute(gateway: &dyn BackendGateway, effect: ChatEffect) -> ChatEvent {
    match effect {
        ChatEffect::CreateSession { task, purpose } => ChatEvent::SessionCreated {
            task,
            purpose,
            result: gateway.new_session().await,
        },
        ChatEffect::FetchHistory { task, session } => {
            let result = gateway.fetch_history(&session).await;
            ChatEvent::HistoryLoaded {
                task,
                session,
                result,
            }
        }
        ChatEffect::SendMessage {
            task,
            session,
            text,
        } => {
            let result = gateway.send_message(&session, &text).await;
            ChatEvent::ReplyReceived {
                task,
                session,
                result,
            }
        }
    }
}
