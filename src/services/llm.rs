//! Language-model client.
//!
//! Replies are never trusted to have a particular shape: they come back as an
//! [`LlmOutput`], which callers inspect field by field.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::ChatMessage;

/// A generator reply: either free text or a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmOutput {
    PlainText(String),
    StructuredFields(Map<String, Value>),
}

impl LlmOutput {
    /// Parse raw completion content. JSON objects (optionally inside a ``` fence)
    /// become `StructuredFields`, anything else is kept as text.
    pub fn from_content(content: &str) -> Self {
        let trimmed = strip_code_fence(content.trim());
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => LlmOutput::StructuredFields(map),
            _ => LlmOutput::PlainText(content.to_string()),
        }
    }

    /// String value of a named field. Plain text has no fields.
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            LlmOutput::StructuredFields(map) => map.get(name).and_then(Value::as_str),
            LlmOutput::PlainText(_) => None,
        }
    }

    /// Text form used when the reply is echoed back into the conversation
    pub fn to_transcript(&self) -> String {
        match self {
            LlmOutput::PlainText(text) => text.clone(),
            LlmOutput::StructuredFields(map) => {
                serde_json::to_string(map).unwrap_or_default()
            }
        }
    }
}

fn strip_code_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Structured reply shapes requested during an agentic run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    Plan,
    Reaction,
    PostText,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Plan => "plan",
            ResponseType::Reaction => "reaction",
            ResponseType::PostText => "post_text",
        }
    }

    /// Instruction describing the JSON object the model must return
    pub fn format_instruction(&self) -> &'static str {
        match self {
            ResponseType::Plan => {
                r#"Respond with a JSON object only: {"reasoning": "<why>", "steps": [{"tool": "<tool name>", "params": {}}]}. Use an empty steps array if no tool is needed."#
            }
            ResponseType::Reaction => {
                r#"Respond with a JSON object only: {"reasoning": "<what you learned from the last step and what comes next>"}"#
            }
            ResponseType::PostText => r#"Respond with a JSON object only: {"text": "<the tweet>"}"#,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("LLM API error: {0}")]
    Api(String),
    #[error("LLM returned no choices")]
    EmptyResponse,
}

/// The generator collaborator
#[async_trait]
pub trait Generator: Send + Sync {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        response_type: Option<ResponseType>,
    ) -> Result<LlmOutput, LlmError>;
}

/// Client for OpenAI-compatible chat completion APIs (OpenRouter by default)
#[derive(Clone)]
pub struct LlmClient {
    api_key: String,
    base_url: String,
    model: String,
    http: Client,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LlmClient {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            http: Client::new(),
        }
    }

    fn build_request(
        &self,
        messages: &[ChatMessage],
        response_type: Option<ResponseType>,
    ) -> CompletionRequest<'_> {
        let mut messages = messages.to_vec();
        let response_format = response_type.map(|rt| {
            messages.push(ChatMessage::system(rt.format_instruction()));
            serde_json::json!({ "type": "json_object" })
        });

        CompletionRequest {
            model: &self.model,
            messages,
            response_format,
        }
    }
}

#[async_trait]
impl Generator for LlmClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        response_type: Option<ResponseType>,
    ) -> Result<LlmOutput, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request(messages, response_type);

        tracing::debug!(
            model = %self.model,
            messages = body.messages.len(),
            response_type = response_type.map(|rt| rt.as_str()),
            "sending chat completion"
        );

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(LlmError::Api(format!("Status {}: {}", status, text)));
        }

        let completion: CompletionResponse = resp.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?
            .message
            .content
            .unwrap_or_default();

        Ok(LlmOutput::from_content(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_content() {
        let out = LlmOutput::from_content("  just a tweet  ");
        assert_eq!(out, LlmOutput::PlainText("  just a tweet  ".to_string()));
        assert_eq!(out.field("text"), None);
    }

    #[test]
    fn test_fenced_json_content() {
        let out = LlmOutput::from_content("```json\n{\"text\": \"hello\"}\n```");
        assert_eq!(out.field("text"), Some("hello"));
    }

    #[test]
    fn test_json_array_stays_text() {
        let out = LlmOutput::from_content("[1, 2]");
        assert!(matches!(out, LlmOutput::PlainText(_)));
    }

    #[test]
    fn test_structured_request_adds_format_instruction() {
        let client = LlmClient::new("key", "https://example.com/api/", "m");
        let messages = vec![ChatMessage::user("hi")];

        let plain = client.build_request(&messages, None);
        assert_eq!(plain.messages.len(), 1);
        assert!(plain.response_format.is_none());

        let plan = client.build_request(&messages, Some(ResponseType::Plan));
        assert_eq!(plan.messages.len(), 2);
        assert_eq!(
            plan.messages[1].content,
            ResponseType::Plan.format_instruction()
        );
        assert!(plan.response_format.is_some());
        assert_eq!(client.base_url, "https://example.com/api");
    }

    #[test]
    fn test_completion_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"reasoning\":\"ok\"}"}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(raw).unwrap();
        let content = parsed.choices[0].message.content.as_deref().unwrap();
        assert_eq!(LlmOutput::from_content(content).field("reasoning"), Some("ok"));
    }
}
