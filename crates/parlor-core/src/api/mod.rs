//! HTTP client for the chat backend (REST + event-stream).

pub mod error;
pub mod sse;
pub mod types;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;

pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use sse::{SseParser, StreamEvent};
pub use types::{
    ChatRequest, ConversationCreated, ConversationSummary, HistoryTurn, ModelInfo, Role,
    StoredMessage,
};

use error::classify_reqwest_error;

/// Standard User-Agent header for parlor API requests.
pub const USER_AGENT: &str = concat!("parlor/", env!("CARGO_PKG_VERSION"));

/// Boxed stream of decoded chat events.
///
/// Dropping the stream abandons the in-flight turn; the turn driver owns it
/// and stops consuming at the first terminal event.
pub type ChatStream = BoxStream<'static, ApiResult<StreamEvent>>;

/// Client for the chat backend. Stateless across calls; cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the given base URL (trailing slash tolerated).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetches the model catalog.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status, or a body that
    /// fails to decode.
    pub async fn models(&self) -> ApiResult<Vec<ModelInfo>> {
        self.get_json("/api/models").await
    }

    /// Fetches the conversation list, most recently updated first.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status, or a body that
    /// fails to decode.
    pub async fn conversations(&self) -> ApiResult<Vec<ConversationSummary>> {
        self.get_json("/api/conversations").await
    }

    /// Fetches the full message history of one conversation.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status, or a body that
    /// fails to decode.
    pub async fn conversation_messages(&self, id: &str) -> ApiResult<Vec<StoredMessage>> {
        let path = format!("/api/conversations/{}/messages", urlencoding::encode(id));
        self.get_json(&path).await
    }

    /// Creates a new conversation with the given title.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status, or a body that
    /// fails to decode.
    pub async fn create_conversation(&self, title: &str) -> ApiResult<ConversationCreated> {
        let response = self
            .http
            .post(self.url("/api/conversations"))
            .header("user-agent", USER_AGENT)
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::parse(format!("Failed to decode created conversation: {e}")))
    }

    /// Deletes a conversation. The backend returns an empty success body.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-2xx status.
    pub async fn delete_conversation(&self, id: &str) -> ApiResult<()> {
        let path = format!("/api/conversations/{}", urlencoding::encode(id));
        let response = self
            .http
            .delete(self.url(&path))
            .header("user-agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        check_status(response).await?;
        Ok(())
    }

    /// Sends one chat turn and returns the decoded event stream.
    ///
    /// Transport failure before a response and non-2xx statuses are reported
    /// as errors here; everything after that arrives as stream items.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-2xx status.
    pub async fn send_chat(&self, request: &ChatRequest) -> ApiResult<ChatStream> {
        let response = self
            .http
            .post(self.url("/api/chat"))
            .header("accept", "text/event-stream")
            .header("user-agent", USER_AGENT)
            .json(request)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let response = check_status(response).await?;
        Ok(SseParser::new(response.bytes_stream()).boxed())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .http
            .get(self.url(path))
            .header("accept", "application/json")
            .header("user-agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::parse(format!("Failed to decode {path} response: {e}")))
    }
}

/// Turns a non-success response into an `HttpStatus` error carrying the body.
async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::http_status(status.as_u16(), &body))
}
