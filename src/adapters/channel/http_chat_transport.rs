//! HTTP chat-thread transport.
//!
//! Talks to a chat-thread REST service on behalf of one fixed channel
//! identity. Requests carry a short-lived bearer credential that is issued by
//! the service's identity endpoint and refreshed here when it nears expiry.
//!
//! # Security
//!
//! - Credential requests are signed with HMAC-SHA256 over `{timestamp}.{body}`
//!   using the channel access key
//! - The access key and issued tokens are held as `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = ChatTransportConfig::new(endpoint, identity, access_key)
//!     .with_token_lifetime(Duration::from_secs(3600));
//! let transport = HttpChatTransport::new(config)?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::foundation::ThreadId;
use crate::ports::{ChannelMessageId, ChannelTransport, ThreadPost, TransportError};

type HmacSha256 = Hmac<Sha256>;

/// Credentials are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Transport configuration.
#[derive(Clone)]
pub struct ChatTransportConfig {
    /// Service base URL.
    pub endpoint: String,
    /// Identity threads are created and messages are sent as.
    pub identity: String,
    access_key: SecretString,
    pub api_version: String,
    /// Lifetime assumed when the identity endpoint omits an expiry.
    pub token_lifetime: Duration,
    pub timeout: Duration,
}

impl ChatTransportConfig {
    pub fn new(endpoint: impl Into<String>, identity: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            identity: identity.into(),
            access_key: SecretString::new(access_key.into()),
            api_version: "2021-09-07".to_string(),
            token_lifetime: Duration::from_secs(3600),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A bearer credential and the instant it stops being valid.
#[derive(Clone)]
pub struct ChannelCredential {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl ChannelCredential {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: SecretString::new(token.into()),
            expires_at,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the credential is still usable at `now` with the refresh margin.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// `ChannelTransport` over the chat-thread REST API.
pub struct HttpChatTransport {
    config: ChatTransportConfig,
    client: Client,
    credential: Mutex<Option<ChannelCredential>>,
}

impl HttpChatTransport {
    pub fn new(config: ChatTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            credential: Mutex::new(None),
        })
    }

    /// Builds `{endpoint}/{segments..}?api-version=..` with each segment escaped.
    fn url(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.config.endpoint)
            .map_err(|e| TransportError::Protocol(format!("invalid endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::Protocol("endpoint cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        url.query_pairs_mut().append_pair("api-version", &self.config.api_version);
        Ok(url)
    }

    /// Hex HMAC-SHA256 of `{timestamp}.{body}` under the access key.
    fn sign(&self, timestamp: i64, body: &str) -> Result<String, TransportError> {
        let mut mac = HmacSha256::new_from_slice(self.config.access_key.expose_secret().as_bytes())
            .map_err(|e| TransportError::Authentication(format!("invalid access key: {}", e)))?;
        mac.update(format!("{}.{}", timestamp, body).as_bytes());
        Ok(mac
            .finalize()
            .into_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect())
    }

    /// Returns the cached bearer token, issuing a new one when it is stale.
    async fn bearer_token(&self) -> Result<String, TransportError> {
        let mut cached = self.credential.lock().await;
        if let Some(credential) = cached.as_ref() {
            if credential.is_fresh(Utc::now()) {
                return Ok(credential.token.expose_secret().clone());
            }
        }

        let credential = self.issue_credential().await?;
        let token = credential.token.expose_secret().clone();
        tracing::debug!(expires_at = %credential.expires_at(), "Channel credential refreshed");
        *cached = Some(credential);
        Ok(token)
    }

    async fn issue_credential(&self) -> Result<ChannelCredential, TransportError> {
        let url = self.url(&["identities", &self.config.identity, ":issueAccessToken"])?;
        let body = serde_json::to_string(&IssueTokenRequest { scopes: vec!["chat"] })
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        let timestamp = Utc::now().timestamp();

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .header("x-timestamp", timestamp.to_string())
            .header("x-signature", self.sign(timestamp, &body)?)
            .body(body)
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => TransportError::RateLimited { retry_after_secs: None },
                _ => TransportError::Authentication(format!("credential request failed ({}): {}", status, detail)),
            });
        }

        let issued: IssuedToken = response
            .json()
            .await
            .map_err(|e| TransportError::Protocol(format!("invalid credential response: {}", e)))?;
        let lifetime = ChronoDuration::from_std(self.config.token_lifetime)
            .unwrap_or_else(|_| ChronoDuration::seconds(3600));
        let expires_at = issued.expires_on.unwrap_or_else(|| Utc::now() + lifetime);

        Ok(ChannelCredential::new(issued.token, expires_at))
    }

    /// Sends an authorized request and maps failure statuses.
    async fn execute(&self, request: RequestBuilder, thread_id: Option<&ThreadId>) -> Result<Response, TransportError> {
        let token = self.bearer_token().await?;
        let response = request.bearer_auth(token).send().await.map_err(network_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            *self.credential.lock().await = None;
        }

        let retry_after = retry_after_secs(&response);
        let detail = response.text().await.unwrap_or_default();
        Err(map_status(status, retry_after, thread_id, detail))
    }
}

fn network_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Network(format!("request timed out: {}", err))
    } else {
        TransportError::Network(err.to_string())
    }
}

fn retry_after_secs(response: &Response) -> Option<u32> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn map_status(status: StatusCode, retry_after: Option<u32>, thread_id: Option<&ThreadId>, detail: String) -> TransportError {
    match (status, thread_id) {
        (StatusCode::TOO_MANY_REQUESTS, _) => TransportError::RateLimited {
            retry_after_secs: retry_after,
        },
        (StatusCode::NOT_FOUND, Some(thread_id)) => TransportError::ThreadNotFound(thread_id.clone()),
        (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => TransportError::Authentication(detail),
        _ => TransportError::Protocol(format!("unexpected status {}: {}", status, detail)),
    }
}

#[async_trait]
impl ChannelTransport for HttpChatTransport {
    async fn create_thread(&self, topic: &str, seed: &[ThreadPost]) -> Result<ThreadId, TransportError> {
        let body = CreateThreadRequest {
            topic,
            participants: vec![Participant {
                id: &self.config.identity,
                display_name: "Assistant",
            }],
        };
        let request = self.client.post(self.url(&["chat", "threads"])?).json(&body);
        let created: CreateThreadResponse = self
            .execute(request, None)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::Protocol(format!("invalid create-thread response: {}", e)))?;

        let thread_id = ThreadId::new(created.chat_thread.id)
            .map_err(|e| TransportError::Protocol(format!("invalid thread id: {}", e)))?;
        tracing::info!(thread_id = %thread_id, seed_messages = seed.len(), "Hand-off thread created");

        for post in seed {
            self.send_message(&thread_id, &post.sender_label, &post.text).await?;
        }
        Ok(thread_id)
    }

    async fn send_message(
        &self,
        thread_id: &ThreadId,
        sender_label: &str,
        text: &str,
    ) -> Result<ChannelMessageId, TransportError> {
        let body = SendMessageRequest {
            content: text,
            sender_display_name: sender_label,
            kind: "text",
        };
        let request = self
            .client
            .post(self.url(&["chat", "threads", thread_id.as_str(), "messages"])?)
            .json(&body);
        let sent: SendMessageResponse = self
            .execute(request, Some(thread_id))
            .await?
            .json()
            .await
            .map_err(|e| TransportError::Protocol(format!("invalid send-message response: {}", e)))?;

        Ok(ChannelMessageId(sent.id))
    }

    async fn delete_thread(&self, thread_id: &ThreadId) -> Result<(), TransportError> {
        let request = self.client.delete(self.url(&["chat", "threads", thread_id.as_str()])?);
        self.execute(request, Some(thread_id)).await?;
        tracing::info!(thread_id = %thread_id, "Hand-off thread deleted");
        Ok(())
    }
}

// ----- Chat service wire types -----

#[derive(Serialize)]
struct IssueTokenRequest {
    scopes: Vec<&'static str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssuedToken {
    token: String,
    #[serde(default)]
    expires_on: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct CreateThreadRequest<'a> {
    topic: &'a str,
    participants: Vec<Participant<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Participant<'a> {
    id: &'a str,
    display_name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateThreadResponse {
    chat_thread: ChatThread,
}

#[derive(Deserialize)]
struct ChatThread {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageRequest<'a> {
    content: &'a str,
    sender_display_name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpChatTransport {
        HttpChatTransport::new(ChatTransportConfig::new(
            "https://chat.example.com/",
            "8:acs:bot",
            "access-key",
        ))
        .unwrap()
    }

    #[test]
    fn urls_escape_thread_ids() {
        let thread = ThreadId::new("19:abc@thread.v2").unwrap();
        let url = transport()
            .url(&["chat", "threads", thread.as_str(), "messages"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://chat.example.com/chat/threads/19:abc@thread.v2/messages?api-version=2021-09-07"
        );

        let url = transport().url(&["chat", "threads", "a/b"]).unwrap();
        assert!(url.path().ends_with("/a%2Fb"));
    }

    #[test]
    fn signature_is_deterministic_hex() {
        let transport = transport();
        let a = transport.sign(1_700_000_000, "{}").unwrap();
        let b = transport.sign(1_700_000_000, "{}").unwrap();
        let c = transport.sign(1_700_000_001, "{}").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn credential_freshness_respects_refresh_margin() {
        let now = Utc::now();
        assert!(ChannelCredential::new("t", now + ChronoDuration::hours(1)).is_fresh(now));
        assert!(!ChannelCredential::new("t", now + ChronoDuration::seconds(60)).is_fresh(now));
        assert!(!ChannelCredential::new("t", now - ChronoDuration::seconds(1)).is_fresh(now));
    }

    #[test]
    fn status_mapping() {
        let thread = ThreadId::new("19:t@thread.v2").unwrap();

        assert_eq!(
            map_status(StatusCode::TOO_MANY_REQUESTS, Some(7), Some(&thread), String::new()),
            TransportError::RateLimited { retry_after_secs: Some(7) }
        );
        assert_eq!(
            map_status(StatusCode::NOT_FOUND, None, Some(&thread), String::new()),
            TransportError::ThreadNotFound(thread.clone())
        );
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, None, None, String::new()),
            TransportError::Protocol(_)
        ));
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, None, None, "denied".to_string()),
            TransportError::Authentication(_)
        ));
    }

    #[test]
    fn wire_shapes() {
        let body = serde_json::to_value(SendMessageRequest {
            content: "hi",
            sender_display_name: "Assistant",
            kind: "text",
        })
        .unwrap();
        assert_eq!(body["senderDisplayName"], "Assistant");
        assert_eq!(body["type"], "text");

        let issued: IssuedToken =
            serde_json::from_str(r#"{"token":"abc","expiresOn":"2030-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(issued.token, "abc");
        assert!(issued.expires_on.is_some());
    }
}
