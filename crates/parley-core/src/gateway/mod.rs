//! Backend gateway.
//!
//! Every network call to the assistant backend goes through
//! [`BackendGateway`]. Each operation is a single round trip with no retry;
//! callers decide what a failure means.

mod error;
mod http;

use std::future::Future;
use std::pin::Pin;

pub use error::{UnavailableError, UnavailableKind};
pub use http::{HttpGateway, HttpGatewayOptions};

use crate::chat::Message;
use crate::identity::SessionId;

/// Boxed future returned by gateway operations.
pub type GatewayFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, UnavailableError>> + Send + 'a>>;

pub trait BackendGateway: Send + Sync {
    /// Requests a fresh session identifier.
    fn new_session(&self) -> GatewayFuture<'_, SessionId>;

    /// Fetches every message recorded for `session`. Empty is not an error.
    fn fetch_history<'a>(&'a self, session: &'a SessionId) -> GatewayFuture<'a, Vec<Message>>;

    /// Sends a user utterance and returns the assistant reply text.
    fn send_message<'a>(
        &'a self,
        session: &'a SessionId,
        text: &'a str,
    ) -> GatewayFuture<'a, String>;
}
