use crate::canvas::payload::{Canvas, CanvasKind};
use crate::chat::send::SendTicket;
use crate::config::AppConfig;
use crate::event::AppEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::mpsc;
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("tokio runtime unavailable: {0}")]
    Runtime(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("history request returned status {0:?}")]
    HistoryStatus(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatPayload {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "canvasType")]
    pub canvas_type: CanvasKind,
    #[serde(default, rename = "canvasUtils")]
    pub canvas_utils: Option<Value>,
}

impl ChatReply {
    pub fn canvas(&self) -> Canvas {
        Canvas::new(self.canvas_type.clone(), self.canvas_utils.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationRecord {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub response: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    #[serde(default)]
    status: String,
    #[serde(default)]
    conversations: Vec<ConversationRecord>,
}

/// Network-bound chat request. Both fields are already sanitized.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub ticket: SendTicket,
    pub payload: ChatPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    pub epoch: u64,
    pub user_id: String,
}

pub fn chat_url(base: &str) -> String {
    format!("{}/api/chat", base.trim_end_matches('/'))
}

pub fn history_url(base: &str) -> String {
    format!("{}/api/conversations", base.trim_end_matches('/'))
}

pub fn decode_chat_reply(body: &str) -> Result<ChatReply, BackendError> {
    Ok(serde_json::from_str(body)?)
}

/// Decodes the history envelope. Conversations come back newest first.
pub fn decode_history(body: &str) -> Result<Vec<ConversationRecord>, BackendError> {
    let envelope: HistoryEnvelope = serde_json::from_str(body)?;
    if envelope.status != "success" {
        return Err(BackendError::HistoryStatus(envelope.status));
    }
    Ok(envelope.conversations)
}

#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl BackendClient {
    pub fn new(config: &AppConfig, tx: mpsc::Sender<AppEvent>) -> Result<Self, BackendError> {
        let runtime_handle =
            Handle::try_current().map_err(|err| BackendError::Runtime(err.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.api_base_url.clone(),
            http,
            tx,
            runtime_handle,
        })
    }

    pub fn send_chat(&self, request: ChatRequest) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let ChatRequest { ticket, payload } = request;
            let result = client.post_chat(&payload).await;
            if let Err(err) = &result {
                tracing::warn!(error = %err, seq = ticket.seq, "chat request failed");
            }
            let _ = client.tx.send(AppEvent::ChatSettled { ticket, result });
        });
    }

    pub fn load_history(&self, request: HistoryRequest) {
        let client = self.clone();
        self.runtime_handle.spawn(async move {
            let result = client.fetch_history(&request.user_id).await;
            let _ = client.tx.send(AppEvent::HistoryLoaded {
                epoch: request.epoch,
                result,
            });
        });
    }

    async fn post_chat(&self, payload: &ChatPayload) -> Result<ChatReply, BackendError> {
        let response = self
            .http
            .post(chat_url(&self.base_url))
            .json(payload)
            .send()
            .await?;
        let body = read_body(response).await?;
        decode_chat_reply(&body)
    }

    async fn fetch_history(&self, user_id: &str) -> Result<Vec<ConversationRecord>, BackendError> {
        let response = self
            .http
            .get(history_url(&self.base_url))
            .query(&[("user_id", user_id)])
            .send()
            .await?;
        let body = read_body(response).await?;
        decode_history(&body)
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(BackendError::Status { status, body });
    }
    Ok(body)
}
