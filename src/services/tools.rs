//! Named actions the agent can invoke from its plan

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Map, Value};

/// Parameters passed to a tool, taken verbatim from the plan step
pub type ToolParams = Map<String, Value>;

/// What a tool hands back to the agent loop
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Text fed back into the conversation
    pub summary: String,
    /// Raw media to attach to the tweet, if the tool produces any
    pub media: Option<Bytes>,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tool API error: {0}")]
    Api(String),
    #[error("failed to decode tool output: {0}")]
    Decode(String),
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// One-line description shown to the model
    fn description(&self) -> &str;

    async fn invoke(&self, params: &ToolParams) -> Result<ToolOutput, ToolError>;
}

/// Tools looked up by exact name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Bulleted `name: description` list for prompt interpolation
    pub fn get_tools_description(&self) -> String {
        if self.tools.is_empty() {
            return "No tools available.".to_string();
        }
        self.tools
            .values()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
