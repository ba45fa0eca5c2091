use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const REPLY_TEMPERATURE: f32 = 0.7;
pub const REPLY_MAX_TOKENS: u32 = 600;
const VERIFY_MAX_TOKENS: u32 = 1;
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Full tutoring exchange: system instruction plus the replayed turns.
    pub fn reply(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: Some(REPLY_TEMPERATURE),
            max_tokens: Some(REPLY_MAX_TOKENS),
        }
    }

    /// Minimal one-token request used purely to validate a credential.
    pub fn verification(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user("hi")],
            temperature: None,
            max_tokens: Some(VERIFY_MAX_TOKENS),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Classified outcome of a gateway call. Only `CredentialInvalid` ends the
/// session; the other two are surfaced as conversational content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("credential rejected by provider")]
    CredentialInvalid,
    #[error("provider error: {message}")]
    Provider {
        code: Option<String>,
        message: String,
    },
    #[error("network error: {0}")]
    Transport(String),
}

/// Blocking chat-completions client against an OpenAI-compatible endpoint.
pub struct CompletionClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl CompletionClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn complete(&self, request: &ChatRequest) -> Result<String, GatewayError> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        decode_chat_body(status, &body)
    }

    /// Any non-error response means the credential works.
    pub fn verify(&self, model: &str) -> Result<(), GatewayError> {
        self.complete(&ChatRequest::verification(model)).map(|_| ())
    }
}

/// Turn an HTTP status plus response body into reply text or a classified
/// failure. Pure, so the classification table is testable without a server.
pub(crate) fn decode_chat_body(status: u16, body: &str) -> Result<String, GatewayError> {
    match serde_json::from_str::<ChatResponse>(body) {
        Ok(parsed) => {
            if let Some(error) = parsed.error {
                return Err(classify_api_error(status, error));
            }
            if status == 401 {
                return Err(GatewayError::CredentialInvalid);
            }
            if !(200..300).contains(&status) {
                return Err(GatewayError::Provider {
                    code: None,
                    message: format!("HTTP {status}"),
                });
            }
            let content = parsed
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .filter(|content| !content.is_empty());
            Ok(content.unwrap_or_else(|| "(no response)".to_string()))
        }
        Err(_) if status == 401 => Err(GatewayError::CredentialInvalid),
        Err(_) if !(200..300).contains(&status) => Err(GatewayError::Provider {
            code: None,
            message: format!("HTTP {status}"),
        }),
        Err(err) => Err(GatewayError::Transport(format!(
            "unreadable response body: {err}"
        ))),
    }
}

fn classify_api_error(status: u16, error: ApiError) -> GatewayError {
    if status == 401 || error.code.as_deref() == Some("invalid_api_key") {
        GatewayError::CredentialInvalid
    } else {
        GatewayError::Provider {
            code: error.code,
            message: error.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    Reply(Result<String, GatewayError>),
    Verified(Result<(), GatewayError>),
}

/// Background gateway adapter: each call runs on its own thread and posts its
/// classified outcome back over a channel drained by the main loop. The
/// caller enforces one in-flight exchange at a time.
pub struct MentorAdapter {
    base_url: String,
    event_tx: Sender<GatewayEvent>,
    event_rx: Receiver<GatewayEvent>,
}

impl MentorAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            base_url: base_url.into(),
            event_tx,
            event_rx,
        }
    }

    pub fn send_chat(&self, api_key: String, request: ChatRequest) {
        let base_url = self.base_url.clone();
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let result = CompletionClient::new(base_url, api_key)
                .and_then(|client| client.complete(&request));
            let _ = tx.send(GatewayEvent::Reply(result));
        });
    }

    pub fn send_verify(&self, api_key: String, model: String) {
        let base_url = self.base_url.clone();
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let result = CompletionClient::new(base_url, api_key)
                .and_then(|client| client.verify(&model));
            let _ = tx.send(GatewayEvent::Verified(result));
        });
    }

    pub fn drain_events(&self) -> Vec<GatewayEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
#[path = "../tests/unit/gateway_tests.rs"]
mod tests;
