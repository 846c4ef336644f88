//! OpenAI-compatible chat completions client, usable as both reply sources.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CompletionConfig;
use crate::error::{RelayError, Result};
use crate::reply::{ReplySource, ReplyStream, StreamReplySource};

/// Marker the API sends as the last SSE payload.
const STREAM_DONE: &str = "[DONE]";

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    /// Set when the provider aborts the stream with an in-band error.
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

pub struct CompletionClient {
    config: CompletionConfig,
    client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn request<'a>(&'a self, content: &'a str, stream: bool) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages: vec![
                RequestMessage {
                    role: Role::System,
                    content: &self.config.system_prompt,
                },
                RequestMessage {
                    role: Role::User,
                    content,
                },
            ],
            stream,
        }
    }

    async fn send(&self, request: &CompletionRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(RelayError::CompletionApi { status, message });
        }
        Ok(response)
    }
}

/// Text delta carried by one SSE payload; `None` for the end marker.
fn parse_stream_data(data: &str) -> Option<Result<String>> {
    let data = data.trim();
    if data == STREAM_DONE {
        return None;
    }
    let chunk = match serde_json::from_str::<StreamChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => return Some(Err(e.into())),
    };
    if let Some(error) = chunk.error {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| error.to_string(), str::to_string);
        return Some(Err(RelayError::Stream(message)));
    }
    Some(Ok(chunk
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.content)
        .collect()))
}

#[async_trait]
impl ReplySource for CompletionClient {
    async fn reply(&self, content: &str) -> Result<String> {
        debug!("Requesting completion for {} characters", content.len());
        let response = self.send(&self.request(content, false)).await?;
        let api_response: CompletionResponse = response.json().await?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::CompletionResponse("No choices in response".to_string()))?;

        Ok(choice.message.content.unwrap_or_default().trim().to_string())
    }
}

#[async_trait]
impl StreamReplySource for CompletionClient {
    async fn stream_reply(&self, content: &str) -> Result<ReplyStream> {
        debug!("Requesting streamed completion for {} characters", content.len());
        let response = self.send(&self.request(content, true)).await?;

        let deltas = response
            .bytes_stream()
            .eventsource()
            .map(|event| match event {
                Ok(event) => parse_stream_data(&event.data),
                Err(e) => Some(Err(RelayError::Stream(e.to_string()))),
            })
            .take_while(|item| futures::future::ready(item.is_some()))
            .filter_map(|item| {
                futures::future::ready(match item {
                    Some(Ok(text)) if text.is_empty() => None,
                    other => other,
                })
            });

        Ok(deltas.boxed())
    }
}
