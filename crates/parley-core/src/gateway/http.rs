//! HTTP implementation of [`BackendGateway`].

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{BackendGateway, GatewayFuture, UnavailableError};
use crate::chat::{Message, Role};
use crate::config::Config;
use crate::identity::SessionId;

const DEFAULT_USER_AGENT: &str = concat!("parley/", env!("CARGO_PKG_VERSION"));

const NEW_SESSION_PATH: &str = "api/get_session_id";
const HISTORY_PATH: &str = "api/get_message_history";
const SEND_PATH: &str = "api/send_message";

#[derive(Debug, Deserialize)]
struct SessionIdResponse {
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct HistoryRequest<'a> {
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    messages: Option<Vec<WireMessage>>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    message: String,
}

/// Connection settings for [`HttpGateway`].
#[derive(Debug, Clone)]
pub struct HttpGatewayOptions {
    pub base_url: Url,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl HttpGatewayOptions {
    /// Resolves options from config, with an optional base URL override.
    pub fn from_config(config: &Config, base_url_override: Option<&str>) -> Result<Self> {
        Ok(Self {
            base_url: config.effective_base_url(base_url_override)?,
            timeout: config.request_timeout(),
            user_agent: config.backend.user_agent.clone(),
        })
    }
}

/// Talks to the assistant backend over HTTP with JSON bodies.
///
/// The session id is sent as an explicit `session_id` body field. The client
/// also keeps a cookie jar so cookies set by the backend ride along with
/// every later request.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    /// Builds the client with a cookie jar, the user agent and the timeout.
    ///
    /// # Errors
    /// Returns an error if the user agent is not a valid header value or the
    /// TLS backend cannot be initialized.
    pub fn new(options: HttpGatewayOptions) -> Result<Self> {
        let agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(agent).context("Invalid user agent")?,
        );

        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: options.base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, UnavailableError> {
        self.base_url.join(path).map_err(|err| {
            UnavailableError::new(
                super::UnavailableKind::Network,
                format!("Invalid endpoint {path}: {err}"),
            )
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, UnavailableError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| UnavailableError::from_transport(&e))?;
        Self::decode(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, UnavailableError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| UnavailableError::from_transport(&e))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, UnavailableError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UnavailableError::http_status(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UnavailableError::from_transport(&e))
    }
}

impl BackendGateway for HttpGateway {
    fn new_session(&self) -> GatewayFuture<'_, SessionId> {
        Box::pin(async move {
            let response: SessionIdResponse = self.get(NEW_SESSION_PATH).await?;
            response
                .session_id
                .filter(|id| !id.trim().is_empty())
                .map(SessionId::new)
                .ok_or_else(UnavailableError::missing_session)
        })
    }

    fn fetch_history<'a>(&'a self, session: &'a SessionId) -> GatewayFuture<'a, Vec<Message>> {
        Box::pin(async move {
            let request = HistoryRequest {
                session_id: session.as_str(),
            };
            let response: HistoryResponse = self.post(HISTORY_PATH, &request).await?;
            Ok(response
                .messages
                .unwrap_or_default()
                .into_iter()
                .enumerate()
                .map(|(id, m)| Message::new(id, Role::from_wire(&m.role), m.content))
                .collect())
        })
    }

    fn send_message<'a>(
        &'a self,
        session: &'a SessionId,
        text: &'a str,
    ) -> GatewayFuture<'a, String> {
        Box::pin(async move {
            let request = SendRequest {
                message: text,
                session_id: session.as_str(),
            };
            let response: SendResponse = self.post(SEND_PATH, &request).await?;
            Ok(response.message)
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::gateway::UnavailableKind;

    fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(HttpGatewayOptions {
            base_url: Url::parse(&format!("{}/", server.uri())).unwrap(),
            timeout: Some(Duration::from_secs(5)),
            user_agent: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_new_session_returns_identifier() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_session_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "s-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let id = gateway(&server).new_session().await.unwrap();
        assert_eq!(id, SessionId::new("s-1"));
    }

    #[tokio::test]
    async fn test_new_session_without_identifier_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_session_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let err = gateway(&server).new_session().await.unwrap_err();
        assert_eq!(err.kind, UnavailableKind::MissingSession);
    }

    #[tokio::test]
    async fn test_fetch_history_sends_session_and_maps_roles() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/get_message_history"))
            .and(body_json(json!({"session_id": "s-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "messages": [
                    {"id": 10, "role": "user", "content": "hi"},
                    {"id": 11, "role": "bot", "content": "hello"}
                ]
            })))
            .mount(&server)
            .await;

        let history = gateway(&server)
            .fetch_history(&SessionId::new("s-1"))
            .await
            .unwrap();

        assert_eq!(
            history,
            vec![
                Message::new(0, Role::User, "hi"),
                Message::new(1, Role::Assistant, "hello"),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_history_empty_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/get_message_history"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"messages": [], "info": "No messages found"})),
            )
            .mount(&server)
            .await;

        let history = gateway(&server)
            .fetch_history(&SessionId::new("s-1"))
            .await
            .unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_send_message_returns_reply_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send_message"))
            .and(body_json(json!({"message": "Who is Harry?", "session_id": "s-1"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "A wizard."})),
            )
            .mount(&server)
            .await;

        let reply = gateway(&server)
            .send_message(&SessionId::new("s-1"), "Who is Harry?")
            .await
            .unwrap();
        assert_eq!(reply, "A wizard.");
    }

    #[tokio::test]
    async fn test_send_message_non_success_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send_message"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "model offline"})),
            )
            .mount(&server)
            .await;

        let err = gateway(&server)
            .send_message(&SessionId::new("s-1"), "hi")
            .await
            .unwrap_err();
        assert_eq!(err.kind, UnavailableKind::HttpStatus);
        assert_eq!(err.message, "HTTP 500: model offline");
    }

    #[tokio::test]
    async fn test_cookies_from_backend_are_sent_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_session_id"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "session=abc; Path=/")
                    .set_body_json(json!({"session_id": "s-1"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/send_message"))
            .and(wiremock::matchers::header("cookie", "session=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&server);
        let id = gateway.new_session().await.unwrap();
        let reply = gateway.send_message(&id, "hi").await.unwrap();
        assert_eq!(reply, "ok");
    }
}
